//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::Path;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{CipherKitError, Result};

/// cipherkit CLI: AES and RSA encryption helpers.
#[derive(Parser)]
#[command(
    name = "cipherkit",
    about = "AES and RSA encryption helpers with explicit key handling",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding .cipherkit.toml (default: current directory)
    #[arg(long, default_value = ".", global = true)]
    pub config_dir: String,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Symmetric AES-CBC operations
    Aes {
        #[command(subcommand)]
        action: AesAction,
    },

    /// Asymmetric RSA operations
    Rsa {
        #[command(subcommand)]
        action: RsaAction,
    },

    /// Time per-call context construction against context reuse
    Bench {
        #[command(subcommand)]
        target: BenchTarget,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// AES subcommands.
#[derive(clap::Subcommand)]
pub enum AesAction {
    /// Generate a random AES key (base64)
    Keygen {
        /// Key size: 128, 192 or 256 (default from config: 256)
        #[arg(long)]
        bits: Option<u32>,
    },

    /// Generate a random 16-byte IV (base64)
    Iv,

    /// Encrypt text
    Encrypt {
        /// Plaintext to encrypt
        text: String,
        #[command(flatten)]
        material: AesKeyArgs,
    },

    /// Decrypt base64 ciphertext
    Decrypt {
        /// Ciphertext to decrypt
        text: String,
        #[command(flatten)]
        material: AesKeyArgs,
    },
}

/// Key material for AES encrypt/decrypt.
#[derive(clap::Args)]
pub struct AesKeyArgs {
    /// Key: base64 AES key, or any passphrase when --iv is given
    #[arg(short, long, env = "CIPHERKIT_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Base64 16-byte IV; switches to PBKDF2-derived keys
    #[arg(long)]
    pub iv: Option<String>,

    /// Base64 salt for PBKDF2 (requires --iv; derived from the key if omitted)
    #[arg(long, requires = "iv")]
    pub salt: Option<String>,
}

/// RSA subcommands.
#[derive(clap::Subcommand)]
pub enum RsaAction {
    /// Generate a key pair
    Keygen {
        /// Modulus size in bits (default from config: 2048)
        #[arg(long)]
        bits: Option<usize>,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Encrypt text with either key
    Encrypt {
        /// Plaintext to encrypt
        text: String,
        #[command(flatten)]
        key: RsaKeyArgs,
    },

    /// Decrypt base64 ciphertext with either key
    Decrypt {
        /// Ciphertext to decrypt
        text: String,
        #[command(flatten)]
        key: RsaKeyArgs,
    },
}

/// Exactly one RSA key, public or private.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct RsaKeyArgs {
    /// Base64 DER public key
    #[arg(long)]
    pub public: Option<String>,

    /// Base64 DER PKCS#8 private key
    #[arg(long, env = "CIPHERKIT_RSA_PRIVATE", hide_env_values = true)]
    pub private: Option<String>,
}

/// Bench targets.
#[derive(clap::Subcommand)]
pub enum BenchTarget {
    /// AES: direct keys and PBKDF2-derived keys
    Aes {
        /// Timed iterations per case (default from config: 100)
        #[arg(long)]
        runs: Option<usize>,
        /// Untimed warm-up iterations per case (default from config: 3)
        #[arg(long)]
        warmup: Option<usize>,
    },

    /// RSA: both keys in both directions
    Rsa {
        /// Modulus size in bits (default from config: 2048)
        #[arg(long)]
        bits: Option<usize>,
        /// Timed iterations per case (default from config: 100)
        #[arg(long)]
        runs: Option<usize>,
        /// Untimed warm-up iterations per case (default from config: 3)
        #[arg(long)]
        warmup: Option<usize>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.cipherkit.toml` from the directory given on the command line.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(Path::new(&cli.config_dir))
}

/// Resolve the AES key, trying in order:
/// 1. `--key` / `CIPHERKIT_KEY` (clap handles both)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the key is wiped from memory on drop.
pub fn resolve_key(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(key) = flag {
        if !key.is_empty() {
            return Ok(Zeroizing::new(key.to_owned()));
        }
    }

    let key = dialoguer::Password::new()
        .with_prompt("Enter key")
        .interact()
        .map_err(|e| CipherKitError::CommandFailed(format!("key prompt: {e}")))?;
    Ok(Zeroizing::new(key))
}
