//! AES-CBC/PKCS#7 cipher contexts.
//!
//! A [`CipherContext`] is bound to one direction, one key and one IV.
//! It can be reused for any number of calls: each call restarts the
//! chaining from the bound IV, so the same plaintext always produces
//! the same ciphertext under the same context.
//!
//! Two ways to build one:
//! - [`build_direct`] takes a raw AES key (base64, 128/192/256 bits) and
//!   derives the IV as `MD5(key)`.
//!
//!   **Warning:** the IV is a function of the key, so equal plaintexts
//!   under the same key encrypt to equal ciphertexts. Use the IV/salt
//!   path with a random IV when that leak matters.
//! - [`build_with_iv_salt`] treats the key as a password and runs it
//!   through PBKDF2 with the given salt, then pairs it with the given IV.

use std::fmt;

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::Zeroizing;

use super::codec;
use super::kdf::{derive_key_with_params, CipherParams};
use super::keys::{self, KeyBits};
use crate::errors::{CipherKitError, Result};

/// Which way a context transforms data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Initialized AES key schedule plus IV, one variant per key size and
/// direction. The `aes`/`cbc` zeroize features wipe both on drop.
#[derive(Clone)]
enum Engine {
    Encrypt128(cbc::Encryptor<Aes128>),
    Encrypt192(cbc::Encryptor<Aes192>),
    Encrypt256(cbc::Encryptor<Aes256>),
    Decrypt128(cbc::Decryptor<Aes128>),
    Decrypt192(cbc::Decryptor<Aes192>),
    Decrypt256(cbc::Decryptor<Aes256>),
}

impl Engine {
    fn new(direction: Direction, bits: KeyBits, key: &[u8], iv: &[u8]) -> Result<Self> {
        let init = |e: cbc::cipher::InvalidLength| {
            CipherKitError::CipherInitError(format!("AES-{bits}-CBC rejected key/IV: {e}"))
        };

        let engine = match (direction, bits) {
            (Direction::Encrypt, KeyBits::Aes128) => {
                Engine::Encrypt128(cbc::Encryptor::new_from_slices(key, iv).map_err(init)?)
            }
            (Direction::Encrypt, KeyBits::Aes192) => {
                Engine::Encrypt192(cbc::Encryptor::new_from_slices(key, iv).map_err(init)?)
            }
            (Direction::Encrypt, KeyBits::Aes256) => {
                Engine::Encrypt256(cbc::Encryptor::new_from_slices(key, iv).map_err(init)?)
            }
            (Direction::Decrypt, KeyBits::Aes128) => {
                Engine::Decrypt128(cbc::Decryptor::new_from_slices(key, iv).map_err(init)?)
            }
            (Direction::Decrypt, KeyBits::Aes192) => {
                Engine::Decrypt192(cbc::Decryptor::new_from_slices(key, iv).map_err(init)?)
            }
            (Direction::Decrypt, KeyBits::Aes256) => {
                Engine::Decrypt256(cbc::Decryptor::new_from_slices(key, iv).map_err(init)?)
            }
        };
        Ok(engine)
    }
}

/// A direction-tagged AES-CBC context bound to one key and IV.
#[derive(Clone)]
pub struct CipherContext {
    direction: Direction,
    key_bits: KeyBits,
    engine: Engine,
}

impl CipherContext {
    fn new(direction: Direction, key: &[u8], iv: &[u8]) -> Result<Self> {
        let key_bits = KeyBits::from_byte_len(key.len())?;
        keys::validate_iv(iv)?;
        Ok(Self {
            direction,
            key_bits,
            engine: Engine::new(direction, key_bits, key, iv)?,
        })
    }

    /// The direction this context was built for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Size of the working AES key.
    pub fn key_bits(&self) -> KeyBits {
        self.key_bits
    }

    fn expect_direction(&self, requested: Direction) -> Result<()> {
        if self.direction != requested {
            return Err(CipherKitError::DirectionMismatch {
                bound: self.direction,
                requested,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherContext")
            .field("direction", &self.direction)
            .field("key_bits", &self.key_bits)
            .field("engine", &"[REDACTED]")
            .finish()
    }
}

/// Build a context from a raw base64 AES key, deriving the IV as `MD5(key)`.
pub fn build_direct(direction: Direction, key: &str) -> Result<CipherContext> {
    let (_, key_bytes) = keys::decode_aes_key(key)?;
    let iv = direct_iv(&key_bytes);
    CipherContext::new(direction, &key_bytes, &*iv)
}

/// The IV `build_direct` pairs with a raw key.
pub(crate) fn direct_iv(raw_key: &[u8]) -> Zeroizing<[u8; keys::IV_LEN]> {
    codec::md5(raw_key)
}

/// Build a context from a password-like key, a 16-byte IV and a salt,
/// using the default derivation params (65 536 iterations, 256-bit key).
pub fn build_with_iv_salt(
    direction: Direction,
    key: &str,
    iv: &[u8],
    salt: &[u8],
) -> Result<CipherContext> {
    build_with_iv_salt_params(direction, key, iv, salt, &CipherParams::default())
}

/// Same as [`build_with_iv_salt`] with explicit derivation params.
pub fn build_with_iv_salt_params(
    direction: Direction,
    key: &str,
    iv: &[u8],
    salt: &[u8],
    params: &CipherParams,
) -> Result<CipherContext> {
    keys::validate_salt(salt)?;
    keys::validate_iv(iv)?;

    let derived = derive_key_with_params(key.as_bytes(), salt, params)?;
    CipherContext::new(direction, &derived, iv)
}

/// Convenience form of [`build_with_iv_salt_params`] taking the IV and
/// salt as base64 text. The decoded buffers are wiped before returning.
pub fn build_with_encoded_iv_salt(
    direction: Direction,
    key: &str,
    iv: &str,
    salt: &str,
    params: &CipherParams,
) -> Result<CipherContext> {
    let salt_bytes = keys::decode_salt(salt)?;
    let iv_bytes = keys::decode_iv(iv)?;
    build_with_iv_salt_params(direction, key, &iv_bytes, &salt_bytes, params)
}

/// Encrypt UTF-8 text, returning base64 ciphertext.
pub fn encrypt(context: &CipherContext, plaintext: &str) -> Result<String> {
    context.expect_direction(Direction::Encrypt)?;

    let ciphertext = match context.engine.clone() {
        Engine::Encrypt128(c) => c.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()),
        Engine::Encrypt192(c) => c.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()),
        Engine::Encrypt256(c) => c.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()),
        _ => {
            return Err(CipherKitError::EncryptionFailed(
                "context engine does not encrypt".into(),
            ))
        }
    };

    Ok(codec::encode(&ciphertext))
}

/// Decrypt base64 ciphertext back to the original text.
///
/// Bad base64, bad block alignment, bad padding and invalid UTF-8 are
/// all reported as [`CipherKitError::PaddingOrKeyMismatch`].
pub fn decrypt(context: &CipherContext, ciphertext: &str) -> Result<String> {
    context.expect_direction(Direction::Decrypt)?;

    let data = codec::decode(ciphertext).ok_or(CipherKitError::PaddingOrKeyMismatch)?;

    let plaintext = match context.engine.clone() {
        Engine::Decrypt128(c) => c.decrypt_padded_vec_mut::<Pkcs7>(&data),
        Engine::Decrypt192(c) => c.decrypt_padded_vec_mut::<Pkcs7>(&data),
        Engine::Decrypt256(c) => c.decrypt_padded_vec_mut::<Pkcs7>(&data),
        _ => return Err(CipherKitError::PaddingOrKeyMismatch),
    }
    .map_err(|_| CipherKitError::PaddingOrKeyMismatch)?;

    String::from_utf8(plaintext).map_err(|e| {
        drop(Zeroizing::new(e.into_bytes()));
        CipherKitError::PaddingOrKeyMismatch
    })
}
