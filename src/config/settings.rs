use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{CipherParams, DEFAULT_ITERATIONS};
use crate::crypto::KeyBits;
use crate::errors::{CipherKitError, Result};

/// Project-level configuration, loaded from `.cipherkit.toml`.
///
/// Every field has a sensible default so cipherkit works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Size of generated AES keys in bits: 128, 192 or 256 (default: 256).
    #[serde(default)]
    pub key_bits: KeyBits,

    /// PBKDF2 iteration count (default: 65 536).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// PBKDF2 output size in bits, used as the AES key (default: 256).
    #[serde(default)]
    pub derived_key_bits: KeyBits,

    /// RSA modulus size for `rsa keygen` (default: 2048).
    #[serde(default = "default_rsa_key_bits")]
    pub rsa_key_bits: usize,

    /// Timed iterations per benchmark case (default: 100).
    #[serde(default = "default_bench_runs")]
    pub bench_runs: usize,

    /// Untimed warm-up iterations per benchmark case (default: 3).
    #[serde(default = "default_bench_warmup")]
    pub bench_warmup: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_rsa_key_bits() -> usize {
    2048
}

fn default_bench_runs() -> usize {
    100
}

fn default_bench_warmup() -> usize {
    3
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_bits: KeyBits::default(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            derived_key_bits: KeyBits::default(),
            rsa_key_bits: default_rsa_key_bits(),
            bench_runs: default_bench_runs(),
            bench_warmup: default_bench_warmup(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".cipherkit.toml";

    /// Load settings from `<dir>/.cipherkit.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CipherKitError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convert the algorithm settings into crypto-layer params.
    pub fn cipher_params(&self) -> Result<CipherParams> {
        let params = CipherParams {
            key_bits: self.key_bits,
            iterations: self.pbkdf2_iterations,
            derived_key_bits: self.derived_key_bits,
        };
        params
            .validate()
            .map_err(|e| CipherKitError::ConfigError(e.to_string()))?;
        Ok(params)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
