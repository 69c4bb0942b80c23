//! RSA key pairs and PKCS#1 v1.5 cipher contexts.
//!
//! Either key can drive either direction:
//!
//! - public encrypt → private decrypt uses type-2 (random) padding;
//! - private encrypt → public decrypt uses type-1 (`0xFF`) padding, the
//!   same block layout as an unprefixed PKCS#1 v1.5 signature.
//!
//! Keys travel as base64 DER: SubjectPublicKeyInfo for public keys and
//! PKCS#8 for private keys.

use std::fmt;

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use super::codec;
use super::symmetric::Direction;
use crate::errors::{CipherKitError, Result};

/// Smallest modulus accepted by [`generate_key_pair`].
pub const MIN_KEY_BITS: usize = 1024;

/// PKCS#1 v1.5 overhead in bytes.
const PADDING_OVERHEAD: usize = 11;

/// Minimum run of `0xFF` bytes in a type-1 block.
const MIN_PS_LEN: usize = 8;

/// A generated RSA key pair.
#[derive(Clone)]
pub struct KeyPair {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

impl KeyPair {
    /// The public half, as an independent key object.
    pub fn public_key(&self) -> RsaKey {
        RsaKey::Public(self.public.clone())
    }

    /// The private half, as an independent key object.
    pub fn private_key(&self) -> RsaKey {
        RsaKey::Private(self.private.clone())
    }

    /// Split into independently owned halves.
    pub fn into_parts(self) -> (RsaKey, RsaKey) {
        (RsaKey::Public(self.public), RsaKey::Private(self.private))
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.size() * 8
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Either half of an RSA key pair.
#[derive(Clone)]
pub enum RsaKey {
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

impl RsaKey {
    /// Modulus size in bytes.
    pub fn size(&self) -> usize {
        match self {
            RsaKey::Public(k) => k.size(),
            RsaKey::Private(k) => k.size(),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, RsaKey::Private(_))
    }
}

impl From<RsaPublicKey> for RsaKey {
    fn from(key: RsaPublicKey) -> Self {
        RsaKey::Public(key)
    }
}

impl From<RsaPrivateKey> for RsaKey {
    fn from(key: RsaPrivateKey) -> Self {
        RsaKey::Private(key)
    }
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsaKey::Public(k) => f
                .debug_struct("RsaKey::Public")
                .field("bits", &(k.size() * 8))
                .finish(),
            RsaKey::Private(k) => f
                .debug_struct("RsaKey::Private")
                .field("bits", &(k.size() * 8))
                .field("key", &"[REDACTED]")
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Key generation and encoding
// ---------------------------------------------------------------------------

/// Generate a key pair. Runs to completion however long it takes;
/// 8192-bit keys can take minutes.
pub fn generate_key_pair(bits: usize) -> Result<KeyPair> {
    if bits < MIN_KEY_BITS || bits % 8 != 0 {
        return Err(CipherKitError::InvalidKeyLength(format!(
            "RSA modulus must be at least {MIN_KEY_BITS} bits and a multiple of 8, got {bits}"
        )));
    }

    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CipherKitError::KeyGenerationFailed(e.to_string()))?;
    let public = private.to_public_key();
    Ok(KeyPair { public, private })
}

/// Base64 DER SubjectPublicKeyInfo of the pair's public key.
pub fn export_public(pair: &KeyPair) -> Result<String> {
    let der = pair
        .public
        .to_public_key_der()
        .map_err(|e| CipherKitError::SerializationError(format!("public key: {e}")))?;
    Ok(codec::encode(der.as_bytes()))
}

/// Base64 DER PKCS#8 of the pair's private key, wiped on drop.
pub fn export_private(pair: &KeyPair) -> Result<Zeroizing<String>> {
    let der = pair
        .private
        .to_pkcs8_der()
        .map_err(|e| CipherKitError::SerializationError(format!("private key: {e}")))?;
    Ok(codec::encode_secret(der.as_bytes()))
}

/// Rebuild a public key from [`export_public`] output.
pub fn import_public(text: &str) -> Result<RsaKey> {
    let der = codec::decode(text).ok_or_else(|| {
        CipherKitError::MalformedKeyEncoding("public key is not valid base64".into())
    })?;
    let key = RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| CipherKitError::MalformedKeyEncoding(format!("public key: {e}")))?;
    Ok(RsaKey::Public(key))
}

/// Rebuild a private key from [`export_private`] output.
pub fn import_private(text: &str) -> Result<RsaKey> {
    let der = codec::decode(text).ok_or_else(|| {
        CipherKitError::MalformedKeyEncoding("private key is not valid base64".into())
    })?;
    let key = RsaPrivateKey::from_pkcs8_der(&der)
        .map_err(|e| CipherKitError::MalformedKeyEncoding(format!("private key: {e}")))?;
    Ok(RsaKey::Private(key))
}

// ---------------------------------------------------------------------------
// Cipher contexts
// ---------------------------------------------------------------------------

/// A direction-tagged RSA context bound to one key.
#[derive(Clone)]
pub struct RsaContext {
    direction: Direction,
    key: RsaKey,
}

impl RsaContext {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Largest UTF-8 message, in bytes, this context can encrypt.
    pub fn max_message_len(&self) -> usize {
        self.key.size().saturating_sub(PADDING_OVERHEAD)
    }
}

impl fmt::Debug for RsaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaContext")
            .field("direction", &self.direction)
            .field("key", &self.key)
            .finish()
    }
}

/// Bind a key to a direction. Works the same for public and private keys.
pub fn build_context(direction: Direction, key: &RsaKey) -> RsaContext {
    RsaContext {
        direction,
        key: key.clone(),
    }
}

/// Encrypt text, returning base64 ciphertext.
pub fn encrypt(context: &RsaContext, plaintext: &str) -> Result<String> {
    if context.direction != Direction::Encrypt {
        return Err(CipherKitError::DirectionMismatch {
            bound: context.direction,
            requested: Direction::Encrypt,
        });
    }

    let msg = plaintext.as_bytes();
    let max = context.max_message_len();
    if msg.len() > max {
        return Err(CipherKitError::MessageTooLong {
            len: msg.len(),
            max,
        });
    }

    let ciphertext = match &context.key {
        RsaKey::Public(key) => key.encrypt(&mut OsRng, Pkcs1v15Encrypt, msg),
        RsaKey::Private(key) => key.sign(Pkcs1v15Sign::new_unprefixed(), msg),
    }
    .map_err(|e| match e {
        rsa::Error::MessageTooLong => CipherKitError::MessageTooLong {
            len: msg.len(),
            max,
        },
        other => CipherKitError::EncryptionFailed(other.to_string()),
    })?;

    Ok(codec::encode(&ciphertext))
}

/// Decrypt base64 ciphertext back to the original text.
///
/// Every failure (wrong key, bad padding, corrupted input) is reported
/// as [`CipherKitError::PaddingOrKeyMismatch`].
pub fn decrypt(context: &RsaContext, ciphertext: &str) -> Result<String> {
    if context.direction != Direction::Decrypt {
        return Err(CipherKitError::DirectionMismatch {
            bound: context.direction,
            requested: Direction::Decrypt,
        });
    }

    let data = codec::decode(ciphertext).ok_or(CipherKitError::PaddingOrKeyMismatch)?;

    let mut plaintext = match &context.key {
        RsaKey::Private(key) => Zeroizing::new(
            key.decrypt(Pkcs1v15Encrypt, &data)
                .map_err(|_| CipherKitError::PaddingOrKeyMismatch)?,
        ),
        RsaKey::Public(key) => public_decrypt(key, &data)?,
    };

    String::from_utf8(std::mem::take(&mut *plaintext)).map_err(|e| {
        drop(Zeroizing::new(e.into_bytes()));
        CipherKitError::PaddingOrKeyMismatch
    })
}

/// Undo a private-key (type-1) encryption with the public exponent.
fn public_decrypt(key: &RsaPublicKey, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let k = key.size();
    if data.len() != k {
        return Err(CipherKitError::PaddingOrKeyMismatch);
    }

    let c = BigUint::from_bytes_be(data);
    if &c >= key.n() {
        return Err(CipherKitError::PaddingOrKeyMismatch);
    }

    let m = c.modpow(key.e(), key.n()).to_bytes_be();
    if m.len() > k {
        return Err(CipherKitError::PaddingOrKeyMismatch);
    }

    // Left-pad back to the modulus length: EM = 0x00 || 0x01 || PS || 0x00 || M
    let mut em = Zeroizing::new(vec![0u8; k]);
    em[k - m.len()..].copy_from_slice(&m);

    unpad_type1(&em).map(|msg| Zeroizing::new(msg.to_vec()))
}

fn unpad_type1(em: &[u8]) -> Result<&[u8]> {
    if em.len() < PADDING_OVERHEAD || em[0] != 0x00 || em[1] != 0x01 {
        return Err(CipherKitError::PaddingOrKeyMismatch);
    }

    let body = &em[2..];
    let ps_len = body.iter().take_while(|&&b| b == 0xFF).count();
    if ps_len < MIN_PS_LEN || body.get(ps_len) != Some(&0x00) {
        return Err(CipherKitError::PaddingOrKeyMismatch);
    }

    Ok(&body[ps_len + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_decrypt_rejects_non_utf8_payload() {
        let pair = generate_key_pair(MIN_KEY_BITS).unwrap();
        let raw = pair
            .private
            .sign(Pkcs1v15Sign::new_unprefixed(), &[0xFF, 0xFE, 0x00])
            .unwrap();

        let dec = build_context(Direction::Decrypt, &pair.public_key());
        assert!(matches!(
            decrypt(&dec, &codec::encode(&raw)),
            Err(CipherKitError::PaddingOrKeyMismatch)
        ));
    }

    #[test]
    fn unpad_type1_accepts_well_formed_block() {
        let mut em = vec![0x00, 0x01];
        em.extend_from_slice(&[0xFF; 8]);
        em.push(0x00);
        em.extend_from_slice(b"hi");
        assert_eq!(unpad_type1(&em).unwrap(), b"hi");
    }

    #[test]
    fn unpad_type1_accepts_empty_message() {
        let mut em = vec![0x00, 0x01];
        em.extend_from_slice(&[0xFF; 9]);
        em.push(0x00);
        assert!(unpad_type1(&em).unwrap().is_empty());
    }

    #[test]
    fn unpad_type1_rejects_short_padding() {
        let mut em = vec![0x00, 0x01];
        em.extend_from_slice(&[0xFF; 7]);
        em.push(0x00);
        em.extend_from_slice(b"abc");
        assert!(unpad_type1(&em).is_err());
    }

    #[test]
    fn unpad_type1_rejects_wrong_block_type() {
        let mut em = vec![0x00, 0x02];
        em.extend_from_slice(&[0xFF; 8]);
        em.push(0x00);
        em.push(b'x');
        assert!(unpad_type1(&em).is_err());
    }

    #[test]
    fn unpad_type1_rejects_missing_separator() {
        let mut em = vec![0x00, 0x01];
        em.extend_from_slice(&[0xFF; 12]);
        assert!(unpad_type1(&em).is_err());
    }

    #[test]
    fn generate_rejects_small_or_ragged_sizes() {
        assert!(matches!(
            generate_key_pair(512),
            Err(CipherKitError::InvalidKeyLength(_))
        ));
        assert!(matches!(
            generate_key_pair(1025),
            Err(CipherKitError::InvalidKeyLength(_))
        ));
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(matches!(
            import_public("@@@"),
            Err(CipherKitError::MalformedKeyEncoding(_))
        ));
        assert!(matches!(
            import_private(&codec::encode(b"not der")),
            Err(CipherKitError::MalformedKeyEncoding(_))
        ));
    }
}
