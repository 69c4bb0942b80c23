//! Stateful AES session: owns key text, optional IV and salt, and caches
//! one cipher context per direction.
//!
//! Four ways in:
//!
//! | constructor                       | mode      | IV             | salt               |
//! |-----------------------------------|-----------|----------------|--------------------|
//! | [`AesSession::new`]               | direct    | `MD5(key)`     | none               |
//! | [`AesSession::with_key`]          | direct    | `MD5(key)`     | none               |
//! | [`AesSession::with_key_iv`]       | derived   | supplied       | `SHA-256(key)`     |
//! | [`AesSession::with_key_iv_salt`]  | derived   | supplied       | supplied           |
//!
//! In direct mode the key must be a base64 AES key. In derived mode the
//! key is any text and goes through PBKDF2. Missing IV/salt values are
//! filled in lazily on first use and can be read back with the getters.
//!
//! Sessions mutate through `&mut self`. Share one across threads only
//! behind a `Mutex`, or give each thread its own.
//!
//! [`AesSession::clear`] builds any context not yet cached, then wipes
//! the key, IV and salt. The session keeps encrypting and decrypting
//! after `clear()`, but the getters fail with `SessionWiped`. Drop the
//! session to get rid of the contexts too.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use super::codec;
use super::kdf::CipherParams;
use super::keys;
use super::symmetric::{self, CipherContext, Direction};
use crate::errors::{CipherKitError, Result};

/// How a session turns its key into a working AES key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Key is a raw AES key; IV derived from it.
    Direct,
    /// Key is a password; PBKDF2 with IV and salt.
    Derived,
}

/// A reusable AES encrypt/decrypt handle.
pub struct AesSession {
    key: Zeroizing<String>,
    iv: Option<Zeroizing<String>>,
    salt: Option<Zeroizing<String>>,
    mode: KeyMode,
    params: CipherParams,
    encryptor: Option<CipherContext>,
    decryptor: Option<CipherContext>,
    cleared: bool,
}

impl AesSession {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// New session with a freshly generated 256-bit key.
    pub fn new() -> Self {
        Self::generate(CipherParams::default())
    }

    /// New session with a freshly generated key of `params.key_bits`.
    pub fn generate(params: CipherParams) -> Self {
        let key = keys::generate_key(params.key_bits);
        Self::build(key, None, None, KeyMode::Direct).with_params(params)
    }

    /// Session over an existing base64 AES key.
    pub fn with_key(key: &str) -> Self {
        Self::build(Zeroizing::new(key.to_owned()), None, None, KeyMode::Direct)
    }

    /// Session over a password-like key and a base64 16-byte IV.
    /// The salt is derived from the key on first use.
    pub fn with_key_iv(key: &str, iv: &str) -> Self {
        Self::build(
            Zeroizing::new(key.to_owned()),
            Some(Zeroizing::new(iv.to_owned())),
            None,
            KeyMode::Derived,
        )
    }

    /// Session over a password-like key, a base64 IV and a base64 salt.
    pub fn with_key_iv_salt(key: &str, iv: &str, salt: &str) -> Self {
        Self::build(
            Zeroizing::new(key.to_owned()),
            Some(Zeroizing::new(iv.to_owned())),
            Some(Zeroizing::new(salt.to_owned())),
            KeyMode::Derived,
        )
    }

    fn build(
        key: Zeroizing<String>,
        iv: Option<Zeroizing<String>>,
        salt: Option<Zeroizing<String>>,
        mode: KeyMode,
    ) -> Self {
        Self {
            key,
            iv,
            salt,
            mode,
            params: CipherParams::default(),
            encryptor: None,
            decryptor: None,
            cleared: false,
        }
    }

    /// Replace the derivation params. Cached contexts are dropped so the
    /// next call rebuilds with the new values.
    pub fn with_params(mut self, params: CipherParams) -> Self {
        self.params = params;
        self.encryptor = None;
        self.decryptor = None;
        self
    }

    // ------------------------------------------------------------------
    // Encrypt / decrypt
    // ------------------------------------------------------------------

    /// Encrypt text, returning base64 ciphertext.
    pub fn encrypt(&mut self, plaintext: &str) -> Result<String> {
        let context = self.context(Direction::Encrypt)?;
        symmetric::encrypt(context, plaintext)
    }

    /// Decrypt base64 ciphertext produced under the same key/IV/salt.
    pub fn decrypt(&mut self, ciphertext: &str) -> Result<String> {
        let context = self.context(Direction::Decrypt)?;
        symmetric::decrypt(context, ciphertext)
    }

    fn slot(&self, direction: Direction) -> &Option<CipherContext> {
        match direction {
            Direction::Encrypt => &self.encryptor,
            Direction::Decrypt => &self.decryptor,
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<CipherContext> {
        match direction {
            Direction::Encrypt => &mut self.encryptor,
            Direction::Decrypt => &mut self.decryptor,
        }
    }

    fn context(&mut self, direction: Direction) -> Result<&CipherContext> {
        if self.slot(direction).is_none() {
            let context = self.build_context(direction)?;
            *self.slot_mut(direction) = Some(context);
        }
        self.slot(direction)
            .as_ref()
            .ok_or(CipherKitError::SessionWiped)
    }

    /// Build a fresh context and fill in any lazily derived IV/salt.
    /// Nothing is stored unless the build succeeds.
    fn build_context(&mut self, direction: Direction) -> Result<CipherContext> {
        self.ensure_live()?;

        match self.mode {
            KeyMode::Direct => {
                let context = symmetric::build_direct(direction, &self.key)?;
                if self.iv.is_none() {
                    self.iv = Some(self.direct_iv()?);
                }
                Ok(context)
            }
            KeyMode::Derived => {
                let iv = self.iv.as_ref().ok_or_else(|| {
                    CipherKitError::InvalidIv("derived-key session has no IV".into())
                })?;
                let salt = match &self.salt {
                    Some(salt) => salt.clone(),
                    None => derive_salt(&self.key),
                };
                let context = symmetric::build_with_encoded_iv_salt(
                    direction,
                    &self.key,
                    iv,
                    &salt,
                    &self.params,
                )?;
                if self.salt.is_none() {
                    self.salt = Some(salt);
                }
                Ok(context)
            }
        }
    }

    fn direct_iv(&self) -> Result<Zeroizing<String>> {
        let (_, raw) = keys::decode_aes_key(&self.key)?;
        Ok(codec::encode_secret(&*symmetric::direct_iv(&raw)))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// A copy of the key text. The caller owns (and should drop) the copy.
    pub fn get_key(&self) -> Result<Zeroizing<String>> {
        self.ensure_live()?;
        Ok(self.key.clone())
    }

    /// A copy of the IV as base64. In direct mode this is the derived
    /// `MD5(key)` value, available even before the first encryption.
    pub fn get_iv(&self) -> Result<Zeroizing<String>> {
        self.ensure_live()?;
        match (&self.iv, self.mode) {
            (Some(iv), _) => Ok(iv.clone()),
            (None, KeyMode::Direct) => self.direct_iv(),
            (None, KeyMode::Derived) => Err(CipherKitError::InvalidIv(
                "derived-key session has no IV".into(),
            )),
        }
    }

    /// A copy of the salt as base64, or `None` in direct mode where no
    /// salt is used.
    pub fn get_salt(&self) -> Result<Option<Zeroizing<String>>> {
        self.ensure_live()?;
        match (&self.salt, self.mode) {
            (_, KeyMode::Direct) => Ok(None),
            (Some(salt), KeyMode::Derived) => Ok(Some(salt.clone())),
            (None, KeyMode::Derived) => Ok(Some(derive_salt(&self.key))),
        }
    }

    /// How this session uses its key.
    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// The derivation params in effect.
    pub fn params(&self) -> &CipherParams {
        &self.params
    }

    /// Whether [`clear`](Self::clear) has run.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    // ------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------

    /// Make both contexts ready, then zero the key, IV and salt and mark
    /// the session wiped.
    ///
    /// Safe to call any number of times and never fails: a direction whose
    /// context cannot be built (bad key material) stays unusable and keeps
    /// reporting `SessionWiped`. Copies already handed out by the getters
    /// are not affected.
    pub fn clear(&mut self) {
        for direction in [Direction::Encrypt, Direction::Decrypt] {
            if self.slot(direction).is_none() {
                if let Ok(context) = self.build_context(direction) {
                    *self.slot_mut(direction) = Some(context);
                }
            }
        }

        self.key.zeroize();
        if let Some(iv) = self.iv.as_mut() {
            iv.zeroize();
        }
        if let Some(salt) = self.salt.as_mut() {
            salt.zeroize();
        }
        self.cleared = true;
    }

    fn ensure_live(&self) -> Result<()> {
        if self.cleared {
            return Err(CipherKitError::SessionWiped);
        }
        Ok(())
    }
}

impl Default for AesSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AesSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesSession")
            .field("key", &"[REDACTED]")
            .field("mode", &self.mode)
            .field("has_iv", &self.iv.is_some())
            .field("has_salt", &self.salt.is_some())
            .field("cleared", &self.cleared)
            .finish()
    }
}

/// Salt used when a derived-key session was not given one.
fn derive_salt(key: &str) -> Zeroizing<String> {
    codec::encode_secret(&*codec::sha256(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> CipherParams {
        CipherParams::with_iterations(16)
    }

    #[test]
    fn generated_session_round_trips() {
        let mut session = AesSession::new();
        let ct = session.encrypt("hello").unwrap();
        assert_eq!(session.decrypt(&ct).unwrap(), "hello");
        assert_eq!(session.mode(), KeyMode::Direct);
    }

    #[test]
    fn direct_iv_populated_after_first_use() {
        let mut session = AesSession::new();
        assert!(session.iv.is_none());
        let before = session.get_iv().unwrap();
        session.encrypt("x").unwrap();
        assert_eq!(session.iv.as_deref(), Some(&*before));
    }

    #[test]
    fn direct_session_has_no_salt() {
        let session = AesSession::new();
        assert!(session.get_salt().unwrap().is_none());
    }

    #[test]
    fn derived_salt_filled_in_lazily() {
        let iv = keys::random_iv();
        let mut session = AesSession::with_key_iv("test key", &iv).with_params(fast());
        assert!(session.salt.is_none());
        let expected = session.get_salt().unwrap().unwrap();
        session.encrypt("x").unwrap();
        assert_eq!(session.salt.as_deref(), Some(&*expected));
    }

    #[test]
    fn contexts_are_cached_per_direction() {
        let mut session = AesSession::new();
        session.encrypt("a").unwrap();
        assert!(session.encryptor.is_some());
        assert!(session.decryptor.is_none());
    }

    #[test]
    fn with_params_drops_cached_contexts() {
        let iv = keys::random_iv();
        let mut session = AesSession::with_key_iv("pw", &iv).with_params(fast());
        session.encrypt("a").unwrap();
        let session = session.with_params(CipherParams::with_iterations(8));
        assert!(session.encryptor.is_none());
        assert_eq!(session.params().iterations, 8);
    }

    #[test]
    fn failed_build_leaves_state_untouched() {
        let mut session = AesSession::with_key("not an aes key");
        assert!(matches!(
            session.encrypt("x"),
            Err(CipherKitError::InvalidKeyLength(_))
        ));
        assert!(session.iv.is_none());
        assert!(session.encryptor.is_none());
        assert_eq!(&*session.get_key().unwrap(), "not an aes key");
    }

    #[test]
    fn clear_zeroes_retained_material() {
        let iv = keys::random_iv();
        let mut session = AesSession::with_key_iv_salt("pw", &iv, "c2FsdA==").with_params(fast());
        session.clear();
        assert!(session.key.is_empty());
        assert!(session.iv.as_ref().map_or(true, |s| s.is_empty()));
        assert!(session.salt.as_ref().map_or(true, |s| s.is_empty()));
        assert!(session.is_cleared());
    }

    #[test]
    fn clear_prepares_both_directions() {
        let mut session = AesSession::with_key_iv("pw", &keys::random_iv()).with_params(fast());
        session.clear();
        assert!(session.encryptor.is_some());
        assert!(session.decryptor.is_some());
    }

    #[test]
    fn clear_with_unusable_key_still_wipes() {
        let mut session = AesSession::with_key("not an aes key");
        session.clear();
        assert!(session.key.is_empty());
        assert!(session.encryptor.is_none());
        assert!(matches!(
            session.encrypt("x"),
            Err(CipherKitError::SessionWiped)
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let session = AesSession::with_key("c2VjcmV0");
        let dbg = format!("{session:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("c2VjcmV0"));
    }
}
