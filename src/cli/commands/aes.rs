//! `cipherkit aes` — key/IV generation, encrypt and decrypt.

use crate::cli::{load_settings, output, resolve_key, AesKeyArgs, Cli};
use crate::crypto::{keys, AesSession, KeyBits, KeyMode};
use crate::errors::Result;

/// Execute `aes keygen`.
pub fn execute_keygen(cli: &Cli, bits: Option<u32>) -> Result<()> {
    let bits = match bits {
        Some(b) => KeyBits::try_from(b)?,
        None => load_settings(cli)?.key_bits,
    };

    tracing::debug!(%bits, "generating AES key");
    let key = keys::generate_key(bits);
    output::value(&key);
    output::tip("Store this key somewhere safe; it cannot be recovered.");
    Ok(())
}

/// Execute `aes iv`.
pub fn execute_iv() -> Result<()> {
    output::value(&keys::random_iv());
    Ok(())
}

/// Execute `aes encrypt`.
pub fn execute_encrypt(cli: &Cli, text: &str, material: &AesKeyArgs) -> Result<()> {
    let mut session = open_session(cli, material)?;
    if session.mode() == KeyMode::Direct {
        output::warning("Direct keys use a fixed IV: equal plaintexts give equal ciphertexts.");
    }
    let result = session.encrypt(text);
    drop(session);
    output::value(&result?);
    Ok(())
}

/// Execute `aes decrypt`.
pub fn execute_decrypt(cli: &Cli, text: &str, material: &AesKeyArgs) -> Result<()> {
    let mut session = open_session(cli, material)?;
    let result = session.decrypt(text);
    drop(session);
    output::value(&result?);
    Ok(())
}

/// Pick the session entry point that matches the supplied material.
fn open_session(cli: &Cli, material: &AesKeyArgs) -> Result<AesSession> {
    let settings = load_settings(cli)?;
    let key = resolve_key(material.key.as_deref())?;

    let session = match (material.iv.as_deref(), material.salt.as_deref()) {
        (Some(iv), Some(salt)) => AesSession::with_key_iv_salt(&key, iv, salt),
        (Some(iv), None) => AesSession::with_key_iv(&key, iv),
        // clap enforces `--salt requires --iv`
        (None, _) => AesSession::with_key(&key),
    };

    tracing::debug!(mode = ?session.mode(), "opened AES session");
    Ok(session.with_params(settings.cipher_params()?))
}
