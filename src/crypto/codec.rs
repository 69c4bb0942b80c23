//! Byte/text plumbing shared by the cipher builders.
//!
//! All text that crosses the public API uses standard, padded base64.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use md5::Md5;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Encode raw bytes as base64 text.
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Encode secret bytes; the returned text is wiped on drop.
pub fn encode_secret(bytes: &[u8]) -> Zeroizing<String> {
    Zeroizing::new(BASE64.encode(bytes))
}

/// Decode base64 text into a buffer that is wiped on drop.
///
/// Returns `None` on malformed input so each caller can pick the error
/// kind that fits its context (key, IV, salt, ciphertext).
pub fn decode(text: &str) -> Option<Zeroizing<Vec<u8>>> {
    BASE64.decode(text.trim()).ok().map(Zeroizing::new)
}

/// MD5 digest, used only to derive the 16-byte IV from a raw AES key.
pub fn md5(bytes: &[u8]) -> Zeroizing<[u8; 16]> {
    let mut out = Zeroizing::new([0u8; 16]);
    out.copy_from_slice(&Md5::digest(bytes));
    out
}

/// SHA-256 digest.
pub fn sha256(bytes: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

/// Fill a fresh buffer of `len` bytes from the OS CSPRNG.
pub fn random_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("not base64!").is_none());
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let text = format!("  {}\n", encode(b"hello"));
        assert_eq!(&**decode(&text).unwrap(), b"hello");
    }

    #[test]
    fn md5_known_vector() {
        // RFC 1321 test suite: MD5("abc")
        assert_eq!(
            hex::encode(*md5(b"abc")),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn random_bytes_have_requested_length_and_differ() {
        let a = random_bytes(32);
        let b = random_bytes(32);
        assert_eq!(a.len(), 32);
        assert_ne!(*a, *b);
    }
}
