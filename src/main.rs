use std::process;

use clap::Parser;
use standup_digest::ai::GenerationError;
use standup_digest::Cli;

/// Logs go to stderr so they never mix with the summary on stdout.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {err}");
            source = err.source();
        }

        if e.chain().any(|err| err.is::<GenerationError>()) {
            eprintln!("Run `standup-digest summary --demo` for an offline summary.");
        }

        process::exit(1);
    }
}
