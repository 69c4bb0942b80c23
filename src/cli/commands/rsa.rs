//! `cipherkit rsa` — key pair generation, encrypt and decrypt with either key.

use serde::Serialize;

use crate::cli::{load_settings, output, Cli, RsaKeyArgs};
use crate::crypto::asymmetric::{self, RsaKey};
use crate::crypto::Direction;
use crate::errors::{CipherKitError, Result};

/// JSON shape of `rsa keygen --format json`.
#[derive(Serialize)]
struct KeyPairJson<'a> {
    bits: usize,
    public: &'a str,
    private: &'a str,
}

/// Execute `rsa keygen`.
pub fn execute_keygen(cli: &Cli, bits: Option<usize>, format: &str) -> Result<()> {
    let bits = match bits {
        Some(b) => b,
        None => load_settings(cli)?.rsa_key_bits,
    };
    let format = parse_format(format)?;

    if bits >= 4096 {
        output::info(&format!("Generating a {bits}-bit key pair, this can take a while..."));
    }
    tracing::debug!(bits, "generating RSA key pair");

    let pair = asymmetric::generate_key_pair(bits)?;
    let public = asymmetric::export_public(&pair)?;
    let private = asymmetric::export_private(&pair)?;

    match format {
        Format::Text => {
            output::value(&format!("public:  {public}"));
            output::value(&format!("private: {}", &*private));
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(&KeyPairJson {
                bits,
                public: &public,
                private: &private,
            })
            .map_err(|e| CipherKitError::SerializationError(e.to_string()))?;
            output::value(&json);
        }
    }

    output::success(&format!("Generated {bits}-bit key pair"));
    output::tip("Keep the private key secret; share only the public key.");
    Ok(())
}

/// Execute `rsa encrypt`.
pub fn execute_encrypt(text: &str, key: &RsaKeyArgs) -> Result<()> {
    let context = asymmetric::build_context(Direction::Encrypt, &import_key(key)?);
    output::value(&asymmetric::encrypt(&context, text)?);
    Ok(())
}

/// Execute `rsa decrypt`.
pub fn execute_decrypt(text: &str, key: &RsaKeyArgs) -> Result<()> {
    let context = asymmetric::build_context(Direction::Decrypt, &import_key(key)?);
    output::value(&asymmetric::decrypt(&context, text)?);
    Ok(())
}

fn import_key(args: &RsaKeyArgs) -> Result<RsaKey> {
    match (args.public.as_deref(), args.private.as_deref()) {
        (Some(public), _) => asymmetric::import_public(public),
        (None, Some(private)) => asymmetric::import_private(private),
        (None, None) => Err(CipherKitError::CommandFailed(
            "pass either --public or --private".into(),
        )),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn parse_format(name: &str) -> Result<Format> {
    match name.to_lowercase().as_str() {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        other => Err(CipherKitError::CommandFailed(format!(
            "unknown format '{other}' — supported: text, json"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_format_known_values() {
        assert_eq!(parse_format("text").unwrap(), Format::Text);
        assert_eq!(parse_format("JSON").unwrap(), Format::Json);
    }

    #[test]
    fn parse_format_unknown_fails() {
        assert!(parse_format("pem").is_err());
    }

    #[test]
    fn import_key_requires_one_key() {
        let args = RsaKeyArgs {
            public: None,
            private: None,
        };
        assert!(matches!(
            import_key(&args),
            Err(CipherKitError::CommandFailed(_))
        ));
    }
}
