//! Integration tests for `AesSession`: construction modes, getters,
//! cross-session compatibility and wiping.

use cipherkit::crypto::keys::random_iv;
use cipherkit::crypto::{generate_key, AesSession, CipherParams, KeyBits, KeyMode};
use cipherkit::errors::CipherKitError;

fn fast() -> CipherParams {
    CipherParams::with_iterations(8)
}

// ---------------------------------------------------------------------------
// Direct-key sessions
// ---------------------------------------------------------------------------

#[test]
fn generated_session_key_can_be_shared() {
    let mut a = AesSession::new();
    let ct = a.encrypt("payload").expect("encrypt");

    let key = a.get_key().expect("key");
    let mut b = AesSession::with_key(&key);
    assert_eq!(b.decrypt(&ct).expect("decrypt"), "payload");
    assert_eq!(*a.get_iv().unwrap(), *b.get_iv().unwrap());
}

#[test]
fn generate_honours_key_bits() {
    let params = CipherParams {
        key_bits: KeyBits::Aes128,
        ..CipherParams::default()
    };
    let session = AesSession::generate(params);
    let key = session.get_key().unwrap();
    // 16 bytes -> 24 base64 characters
    assert_eq!(key.len(), 24);
}

#[test]
fn sessions_share_contexts_across_many_calls() {
    let key = generate_key(KeyBits::Aes256);
    let mut session = AesSession::with_key(&key);

    for i in 0..50 {
        let text = format!("message #{i}");
        let ct = session.encrypt(&text).unwrap();
        assert_eq!(session.decrypt(&ct).unwrap(), text);
    }
}

#[test]
fn key_only_session_rejects_password_text() {
    let mut session = AesSession::with_key("correct horse battery staple");
    assert_eq!(session.mode(), KeyMode::Direct);
    assert!(matches!(
        session.encrypt("x"),
        Err(CipherKitError::InvalidKeyLength(_))
    ));
}

// ---------------------------------------------------------------------------
// Derived-key sessions
// ---------------------------------------------------------------------------

#[test]
fn key_iv_session_round_trips_and_exposes_salt() {
    let iv = random_iv();
    let mut a = AesSession::with_key_iv("my passphrase", &iv).with_params(fast());
    assert_eq!(a.mode(), KeyMode::Derived);

    let ct = a.encrypt("hello").unwrap();
    let salt = a.get_salt().unwrap().expect("derived sessions have a salt");

    let mut b = AesSession::with_key_iv_salt("my passphrase", &iv, &salt).with_params(fast());
    assert_eq!(b.decrypt(&ct).unwrap(), "hello");
}

#[test]
fn key_iv_salt_session_uses_supplied_values() {
    let iv = random_iv();
    let salt = random_iv();
    let session = AesSession::with_key_iv_salt("pw", &iv, &salt).with_params(fast());

    assert_eq!(*session.get_iv().unwrap(), iv);
    assert_eq!(session.get_salt().unwrap().as_deref().map(|s| s.as_str()), Some(salt.as_str()));
}

#[test]
fn different_salts_do_not_interoperate() {
    let iv = random_iv();
    let mut a = AesSession::with_key_iv_salt("pw", &iv, "c2FsdC1h").with_params(fast());
    let mut b = AesSession::with_key_iv_salt("pw", &iv, "c2FsdC1i").with_params(fast());

    let ct = a.encrypt("secret text").unwrap();
    match b.decrypt(&ct) {
        Err(e) => assert!(matches!(e, CipherKitError::PaddingOrKeyMismatch)),
        Ok(text) => assert_ne!(text, "secret text"),
    }
}

#[test]
fn iteration_count_changes_ciphertext() {
    let iv = random_iv();
    let mut a = AesSession::with_key_iv("pw", &iv).with_params(CipherParams::with_iterations(2));
    let mut b = AesSession::with_key_iv("pw", &iv).with_params(CipherParams::with_iterations(3));
    assert_ne!(a.encrypt("x").unwrap(), b.encrypt("x").unwrap());
}

#[test]
fn bad_iv_is_reported() {
    let mut short = AesSession::with_key_iv("pw", "AAAA").with_params(fast());
    assert!(matches!(short.encrypt("x"), Err(CipherKitError::InvalidIv(_))));

    let mut garbage = AesSession::with_key_iv("pw", "???").with_params(fast());
    assert!(matches!(
        garbage.decrypt("AAAA"),
        Err(CipherKitError::InvalidIv(_))
    ));
}

#[test]
fn empty_salt_is_reported() {
    let iv = random_iv();
    let mut session = AesSession::with_key_iv_salt("pw", &iv, "").with_params(fast());
    assert!(matches!(
        session.encrypt("x"),
        Err(CipherKitError::InvalidSalt(_))
    ));
}

#[test]
fn session_usable_after_failed_decrypt() {
    let mut session = AesSession::new();
    assert!(matches!(
        session.decrypt("garbage"),
        Err(CipherKitError::PaddingOrKeyMismatch)
    ));

    let ct = session.encrypt("after failure").unwrap();
    assert_eq!(session.decrypt(&ct).unwrap(), "after failure");
    assert!(session.get_key().is_ok());
}

// ---------------------------------------------------------------------------
// Wiping
// ---------------------------------------------------------------------------

#[test]
fn clear_is_idempotent() {
    let mut session = AesSession::new();
    session.clear();
    session.clear();
    assert!(session.is_cleared());
}

#[test]
fn getters_fail_after_clear() {
    let mut session = AesSession::with_key_iv("pw", &random_iv()).with_params(fast());
    session.clear();

    assert!(matches!(session.get_key(), Err(CipherKitError::SessionWiped)));
    assert!(matches!(session.get_iv(), Err(CipherKitError::SessionWiped)));
    assert!(matches!(session.get_salt(), Err(CipherKitError::SessionWiped)));
}

#[test]
fn copies_survive_clear() {
    let mut session = AesSession::new();
    let key = session.get_key().unwrap();
    let iv = session.get_iv().unwrap();
    session.clear();

    assert!(!key.is_empty());
    assert!(!iv.is_empty());
    assert!(AesSession::with_key(&key).encrypt("still works").is_ok());
}

#[test]
fn shared_key_session_decrypts_after_clear() {
    let mut a = AesSession::new();
    let ct = a.encrypt("shared secret").unwrap();

    let key = a.get_key().unwrap();
    let mut b = AesSession::with_key(&key);
    b.clear();

    assert_eq!(b.decrypt(&ct).unwrap(), "shared secret");
}

#[test]
fn fresh_session_works_after_clear() {
    let mut session = AesSession::new();
    session.clear();

    let ct = session.encrypt("x").unwrap();
    assert_eq!(session.decrypt(&ct).unwrap(), "x");
}

#[test]
fn derived_session_works_after_clear() {
    let iv = random_iv();
    let mut a = AesSession::with_key_iv_salt("pw", &iv, "c2FsdA==").with_params(fast());
    let ct = a.encrypt("derived").unwrap();

    let mut b = AesSession::with_key_iv_salt("pw", &iv, "c2FsdA==").with_params(fast());
    b.clear();
    assert_eq!(b.decrypt(&ct).unwrap(), "derived");
}

#[test]
fn clear_with_bad_key_material_reports_wiped() {
    let mut session = AesSession::with_key("correct horse battery staple");
    session.clear();
    assert!(matches!(
        session.encrypt("x"),
        Err(CipherKitError::SessionWiped)
    ));
}

#[test]
fn cached_context_outlives_clear() {
    let mut session = AesSession::new();
    let before = session.encrypt("x").unwrap();
    session.clear();

    assert_eq!(session.encrypt("x").unwrap(), before);
}
