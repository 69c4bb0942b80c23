//! `cipherkit version` — display the version and the crypto defaults.

use console::style;

use crate::crypto::kdf::DEFAULT_ITERATIONS;
use crate::crypto::KeyBits;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("cipherkit {current}");
    println!(
        "{} AES-{}-CBC/PKCS#7, PBKDF2-HMAC-SHA256 x{}, RSA PKCS#1 v1.5",
        style("defaults:").dim(),
        KeyBits::default(),
        DEFAULT_ITERATIONS
    );
    Ok(())
}
