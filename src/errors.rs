use thiserror::Error;

use crate::crypto::Direction;

/// All errors that can occur in cipherkit.
#[derive(Debug, Error)]
pub enum CipherKitError {
    // --- Key material errors ---
    #[error("Invalid key length: {0}")]
    InvalidKeyLength(String),

    #[error("Invalid IV: {0}")]
    InvalidIv(String),

    #[error("Invalid salt: {0}")]
    InvalidSalt(String),

    #[error("Malformed key encoding: {0}")]
    MalformedKeyEncoding(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Cipher errors ---
    #[error("Cipher initialisation failed: {0}")]
    CipherInitError(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, wrong IV, corrupted or tampered ciphertext all land here.
    #[error("Decryption failed — wrong key/IV or corrupted data")]
    PaddingOrKeyMismatch,

    #[error("Message too long: {len} bytes, this key accepts at most {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("Cipher context is bound to {bound}, cannot use it to {requested}")]
    DirectionMismatch {
        bound: Direction,
        requested: Direction,
    },

    // --- Session errors ---
    #[error("Session key material has been wiped")]
    SessionWiped,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for cipherkit results.
pub type Result<T> = std::result::Result<T, CipherKitError>;
