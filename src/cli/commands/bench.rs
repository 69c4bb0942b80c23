//! `cipherkit bench` — per-call context construction vs. context reuse.
//!
//! Each case encrypts (or decrypts) the same kind of input `warmup + runs`
//! times. The "per call" cases build a fresh cipher context on every
//! iteration, the "reused" cases build one up front.

use crate::bench::{BenchReport, TimedLoop};
use crate::cli::{load_settings, output, Cli};
use crate::crypto::{asymmetric, keys, symmetric, Direction};
use crate::errors::Result;

const SAMPLE: &str = "The quick brown fox jumps over the lazy dog 0123456789";

/// Resolved loop sizes for one bench invocation.
struct Plan {
    runs: usize,
    warmup: usize,
}

impl Plan {
    fn timed(&self, label: &str) -> TimedLoop {
        TimedLoop::new(label).runs(self.runs).warmup(self.warmup)
    }
}

/// Execute `bench aes`.
pub fn execute_aes(cli: &Cli, runs: Option<usize>, warmup: Option<usize>) -> Result<()> {
    let settings = load_settings(cli)?;
    let params = settings.cipher_params()?;
    let plan = Plan {
        runs: runs.unwrap_or(settings.bench_runs),
        warmup: warmup.unwrap_or(settings.bench_warmup),
    };

    let key = keys::generate_key(settings.key_bits);
    let iv = keys::random_iv();
    let salt = keys::random_iv();

    output::info(&format!(
        "AES-{} · {} runs, {} warm-up, PBKDF2 {} iterations",
        settings.key_bits, plan.runs, plan.warmup, params.iterations
    ));

    let mut reports: Vec<BenchReport> = Vec::new();

    reports.push(plan.timed("direct key, context per call").run(|_| {
        let ctx = symmetric::build_direct(Direction::Encrypt, &key)?;
        symmetric::encrypt(&ctx, SAMPLE).map(drop)
    })?);

    let direct = symmetric::build_direct(Direction::Encrypt, &key)?;
    reports.push(
        plan.timed("direct key, reused context")
            .run(|_| symmetric::encrypt(&direct, SAMPLE).map(drop))?,
    );

    reports.push(plan.timed("pbkdf2 key, context per call").run(|_| {
        let ctx =
            symmetric::build_with_encoded_iv_salt(Direction::Encrypt, &key, &iv, &salt, &params)?;
        symmetric::encrypt(&ctx, SAMPLE).map(drop)
    })?);

    let derived =
        symmetric::build_with_encoded_iv_salt(Direction::Encrypt, &key, &iv, &salt, &params)?;
    reports.push(
        plan.timed("pbkdf2 key, reused context")
            .run(|_| symmetric::encrypt(&derived, SAMPLE).map(drop))?,
    );

    output::print_bench_table(&reports);
    Ok(())
}

/// Execute `bench rsa`.
pub fn execute_rsa(
    cli: &Cli,
    bits: Option<usize>,
    runs: Option<usize>,
    warmup: Option<usize>,
) -> Result<()> {
    let settings = load_settings(cli)?;
    let bits = bits.unwrap_or(settings.rsa_key_bits);
    let plan = Plan {
        runs: runs.unwrap_or(settings.bench_runs),
        warmup: warmup.unwrap_or(settings.bench_warmup),
    };

    output::info(&format!(
        "RSA-{bits} · {} runs, {} warm-up",
        plan.runs, plan.warmup
    ));
    tracing::debug!(bits, "generating benchmark key pair");

    let pair = asymmetric::generate_key_pair(bits)?;
    let public = pair.public_key();
    let private = pair.private_key();

    // Decrypt cases need one ciphertext per iteration, made ahead of time.
    let total = plan.warmup + plan.runs;
    let by_public = prepare(&public, total)?;
    let by_private = prepare(&private, total)?;

    let mut reports: Vec<BenchReport> = Vec::new();

    for (name, encrypt_key, decrypt_key, inputs) in [
        ("public encrypt / private decrypt", &public, &private, &by_public),
        ("private encrypt / public decrypt", &private, &public, &by_private),
    ] {
        reports.push(plan.timed(&format!("{name}: encrypt, per call")).run(|_| {
            let ctx = asymmetric::build_context(Direction::Encrypt, encrypt_key);
            asymmetric::encrypt(&ctx, SAMPLE).map(drop)
        })?);

        let enc = asymmetric::build_context(Direction::Encrypt, encrypt_key);
        reports.push(
            plan.timed(&format!("{name}: encrypt, reused"))
                .run(|_| asymmetric::encrypt(&enc, SAMPLE).map(drop))?,
        );

        reports.push(plan.timed(&format!("{name}: decrypt, per call")).run(|i| {
            let ctx = asymmetric::build_context(Direction::Decrypt, decrypt_key);
            asymmetric::decrypt(&ctx, &inputs[i]).map(drop)
        })?);

        let dec = asymmetric::build_context(Direction::Decrypt, decrypt_key);
        reports.push(
            plan.timed(&format!("{name}: decrypt, reused"))
                .run(|i| asymmetric::decrypt(&dec, &inputs[i]).map(drop))?,
        );
    }

    output::print_bench_table(&reports);
    Ok(())
}

/// Encrypt `SAMPLE` `count` times with `key`.
fn prepare(key: &asymmetric::RsaKey, count: usize) -> Result<Vec<String>> {
    let ctx = asymmetric::build_context(Direction::Encrypt, key);
    (0..count)
        .map(|_| asymmetric::encrypt(&ctx, SAMPLE))
        .collect()
}
