use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

/// Triple-board heads-up hold'em match referee.
#[derive(Debug, Parser)]
#[command(name = "referee")]
struct Args {
    /// Path to a TOML configuration file; defaults and the TRIBOARD_*
    /// environment variables apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    match triboard_referee::run(args.config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}
