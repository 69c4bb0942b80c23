//! Configuration loading (`.cipherkit.toml`).

pub mod settings;

pub use settings::Settings;
