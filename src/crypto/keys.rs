//! Key material helpers: sizes, validation, decoding and random generation.
//!
//! Every routine that turns text into raw bytes hands back a
//! `Zeroizing` buffer, so the bytes are wiped as soon as the caller's
//! scope ends.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::codec;
use crate::errors::{CipherKitError, Result};

/// Length of an AES-CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Supported AES key strengths.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum KeyBits {
    Aes128,
    Aes192,
    #[default]
    Aes256,
}

impl KeyBits {
    /// Key length in bits.
    pub fn bits(self) -> u32 {
        match self {
            KeyBits::Aes128 => 128,
            KeyBits::Aes192 => 192,
            KeyBits::Aes256 => 256,
        }
    }

    /// Key length in bytes.
    pub fn byte_len(self) -> usize {
        self.bits() as usize / 8
    }

    /// Map a raw key length in bytes back to a strength.
    pub fn from_byte_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(KeyBits::Aes128),
            24 => Ok(KeyBits::Aes192),
            32 => Ok(KeyBits::Aes256),
            other => Err(CipherKitError::InvalidKeyLength(format!(
                "AES keys must be 16, 24 or 32 bytes, got {other}"
            ))),
        }
    }
}

impl TryFrom<u32> for KeyBits {
    type Error = CipherKitError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(KeyBits::Aes128),
            192 => Ok(KeyBits::Aes192),
            256 => Ok(KeyBits::Aes256),
            other => Err(CipherKitError::InvalidKeyLength(format!(
                "AES key size must be 128, 192 or 256 bits, got {other}"
            ))),
        }
    }
}

impl From<KeyBits> for u32 {
    fn from(bits: KeyBits) -> Self {
        bits.bits()
    }
}

impl fmt::Display for KeyBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Decode a base64 AES key and check that it has a valid AES length.
pub fn decode_aes_key(key: &str) -> Result<(KeyBits, Zeroizing<Vec<u8>>)> {
    let bytes = codec::decode(key).ok_or_else(|| {
        CipherKitError::InvalidKeyLength("key is not valid base64 text".into())
    })?;
    let bits = KeyBits::from_byte_len(bytes.len())?;
    Ok((bits, bytes))
}

/// Check that `iv` is exactly one AES block long.
pub fn validate_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != IV_LEN {
        return Err(CipherKitError::InvalidIv(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}

/// Check that a key-derivation salt is non-empty.
pub fn validate_salt(salt: &[u8]) -> Result<()> {
    if salt.is_empty() {
        return Err(CipherKitError::InvalidSalt("salt cannot be empty".into()));
    }
    Ok(())
}

/// Decode a base64 IV and validate its length.
pub fn decode_iv(iv: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = codec::decode(iv)
        .ok_or_else(|| CipherKitError::InvalidIv("IV is not valid base64 text".into()))?;
    validate_iv(&bytes)?;
    Ok(bytes)
}

/// Decode a base64 salt and make sure it is non-empty.
pub fn decode_salt(salt: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = codec::decode(salt)
        .ok_or_else(|| CipherKitError::InvalidSalt("salt is not valid base64 text".into()))?;
    validate_salt(&bytes)?;
    Ok(bytes)
}

/// Generate a random AES key and return it as base64 text.
///
/// The raw key bytes never outlive this call.
pub fn generate_key(bits: KeyBits) -> Zeroizing<String> {
    let raw = codec::random_bytes(bits.byte_len());
    codec::encode_secret(&raw)
}

/// Generate a random 256-bit AES key as base64 text.
pub fn generate_default_key() -> Zeroizing<String> {
    generate_key(KeyBits::default())
}

/// Draw a random 16-byte IV and return it as base64 text.
pub fn random_iv() -> String {
    codec::encode(&codec::random_bytes(IV_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bits_round_trip_through_u32() {
        for bits in [128u32, 192, 256] {
            let kb = KeyBits::try_from(bits).unwrap();
            assert_eq!(u32::from(kb), bits);
            assert_eq!(kb.byte_len() * 8, bits as usize);
        }
    }

    #[test]
    fn key_bits_rejects_odd_sizes() {
        assert!(matches!(
            KeyBits::try_from(512),
            Err(CipherKitError::InvalidKeyLength(_))
        ));
        assert!(KeyBits::from_byte_len(20).is_err());
    }

    #[test]
    fn generated_keys_decode_to_requested_length() {
        for bits in [KeyBits::Aes128, KeyBits::Aes192, KeyBits::Aes256] {
            let key = generate_key(bits);
            let (decoded_bits, raw) = decode_aes_key(&key).unwrap();
            assert_eq!(decoded_bits, bits);
            assert_eq!(raw.len(), bits.byte_len());
        }
    }

    #[test]
    fn default_key_is_256_bits() {
        let key = generate_default_key();
        let (bits, _) = decode_aes_key(&key).unwrap();
        assert_eq!(bits, KeyBits::Aes256);
    }

    #[test]
    fn decode_aes_key_rejects_non_base64() {
        assert!(matches!(
            decode_aes_key("test key"),
            Err(CipherKitError::InvalidKeyLength(_))
        ));
    }

    #[test]
    fn random_iv_is_one_block() {
        let iv = random_iv();
        assert_eq!(decode_iv(&iv).unwrap().len(), IV_LEN);
        assert_ne!(iv, random_iv());
    }

    #[test]
    fn short_iv_rejected() {
        assert!(matches!(
            validate_iv(&[0u8; 8]),
            Err(CipherKitError::InvalidIv(_))
        ));
    }

    #[test]
    fn empty_salt_rejected() {
        assert!(matches!(
            validate_salt(&[]),
            Err(CipherKitError::InvalidSalt(_))
        ));
        assert!(matches!(
            decode_salt(""),
            Err(CipherKitError::InvalidSalt(_))
        ));
    }
}
