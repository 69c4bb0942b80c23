use clap::Parser;
use cipherkit::cli::commands::{aes, bench, completions, rsa, version};
use cipherkit::cli::{AesAction, BenchTarget, Cli, Commands, RsaAction};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Aes { ref action } => match action {
            AesAction::Keygen { bits } => aes::execute_keygen(&cli, *bits),
            AesAction::Iv => aes::execute_iv(),
            AesAction::Encrypt { text, material } => aes::execute_encrypt(&cli, text, material),
            AesAction::Decrypt { text, material } => aes::execute_decrypt(&cli, text, material),
        },
        Commands::Rsa { ref action } => match action {
            RsaAction::Keygen { bits, format } => rsa::execute_keygen(&cli, *bits, format),
            RsaAction::Encrypt { text, key } => rsa::execute_encrypt(text, key),
            RsaAction::Decrypt { text, key } => rsa::execute_decrypt(text, key),
        },
        Commands::Bench { ref target } => match target {
            BenchTarget::Aes { runs, warmup } => bench::execute_aes(&cli, *runs, *warmup),
            BenchTarget::Rsa { bits, runs, warmup } => {
                bench::execute_rsa(&cli, *bits, *runs, *warmup)
            }
        },
        Commands::Version => version::execute(),
        Commands::Completions { ref shell } => completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        cipherkit::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `CIPHERKIT_LOG` (default: warn).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("CIPHERKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}
