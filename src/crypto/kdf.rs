//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count and derived key size are carried in
//! `CipherParams` so tests (and `.cipherkit.toml`) can dial them down
//! without touching the cipher builders.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::keys::{validate_salt, KeyBits};
use crate::errors::{CipherKitError, Result};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 65_536;

/// Tunable algorithm constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherParams {
    /// Size of randomly generated AES keys (default: 256).
    pub key_bits: KeyBits,
    /// PBKDF2 iterations (default: 65 536).
    pub iterations: u32,
    /// Size of the PBKDF2 output used as the AES key (default: 256).
    pub derived_key_bits: KeyBits,
}

impl Default for CipherParams {
    fn default() -> Self {
        Self {
            key_bits: KeyBits::Aes256,
            iterations: DEFAULT_ITERATIONS,
            derived_key_bits: KeyBits::Aes256,
        }
    }
}

impl CipherParams {
    /// Same defaults with a different iteration count.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Reject parameter sets the derivation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(CipherKitError::KeyDerivationFailed(
                "PBKDF2 iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Derive an AES key from `password` and `salt` with the default params.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    derive_key_with_params(password, salt, &CipherParams::default())
}

/// Derive an AES key with explicit params.
///
/// Identical password, salt and params always yield the identical key.
pub fn derive_key_with_params(
    password: &[u8],
    salt: &[u8],
    params: &CipherParams,
) -> Result<Zeroizing<Vec<u8>>> {
    validate_salt(salt)?;
    params.validate()?;

    let mut key = Zeroizing::new(vec![0u8; params.derived_key_bits.byte_len()]);
    pbkdf2_hmac::<Sha256>(password, salt, params.iterations, &mut key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_documented_constants() {
        let p = CipherParams::default();
        assert_eq!(p.key_bits.bits(), 256);
        assert_eq!(p.iterations, 65_536);
        assert_eq!(p.derived_key_bits.bits(), 256);
    }

    #[test]
    fn derive_key_is_deterministic() {
        let params = CipherParams::with_iterations(16);
        let a = derive_key_with_params(b"test key", b"test salt", &params).unwrap();
        let b = derive_key_with_params(b"test key", b"test salt", &params).unwrap();
        assert_eq!(*a, *b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn derived_key_length_follows_params() {
        let params = CipherParams {
            derived_key_bits: KeyBits::Aes128,
            ..CipherParams::with_iterations(4)
        };
        let key = derive_key_with_params(b"pw", b"salt", &params).unwrap();
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn different_salts_give_different_keys() {
        let params = CipherParams::with_iterations(8);
        let a = derive_key_with_params(b"pw", b"salt-1", &params).unwrap();
        let b = derive_key_with_params(b"pw", b"salt-2", &params).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn empty_salt_rejected() {
        let result = derive_key_with_params(b"pw", b"", &CipherParams::with_iterations(1));
        assert!(matches!(result, Err(CipherKitError::InvalidSalt(_))));
    }

    #[test]
    fn zero_iterations_rejected() {
        let result = derive_key_with_params(b"pw", b"salt", &CipherParams::with_iterations(0));
        assert!(matches!(result, Err(CipherKitError::KeyDerivationFailed(_))));
    }

    #[test]
    fn pbkdf2_sha256_known_vector() {
        // RFC 7914 section 11: PBKDF2-HMAC-SHA256("passwd", "salt", c=1, dkLen=64),
        // first 32 bytes.
        let params = CipherParams::with_iterations(1);
        let key = derive_key_with_params(b"passwd", b"salt", &params).unwrap();
        assert_eq!(
            hex::encode(&*key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }
}
