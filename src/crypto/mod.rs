//! Cryptographic primitives for cipherkit.
//!
//! This module provides:
//! - Base64/digest/random plumbing (`codec`)
//! - Key sizes, validation and generation (`keys`)
//! - PBKDF2-HMAC-SHA256 key derivation (`kdf`)
//! - AES-CBC cipher contexts (`symmetric`)
//! - The stateful AES session handle (`session`)
//! - RSA key pairs and contexts (`asymmetric`)

pub mod asymmetric;
pub mod codec;
pub mod kdf;
pub mod keys;
pub mod session;
pub mod symmetric;

// Re-export the most commonly used items so callers can write:
//   use cipherkit::crypto::{AesSession, build_direct, Direction, ...};
pub use asymmetric::{KeyPair, RsaContext, RsaKey};
pub use kdf::CipherParams;
pub use keys::{generate_default_key, generate_key, random_iv, KeyBits};
pub use session::{AesSession, KeyMode};
pub use symmetric::{
    build_direct, build_with_encoded_iv_salt, build_with_iv_salt, build_with_iv_salt_params,
    CipherContext, Direction,
};
