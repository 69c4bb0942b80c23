pub mod aes;
pub mod bench;
pub mod completions;
pub mod rsa;
pub mod version;
