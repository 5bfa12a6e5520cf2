//! playlist-bridge - Transfer playlists between Spotify and YouTube
//!
//! Usage:
//!   playlist-bridge transfer <tracks.json> --catalog <catalog.json>
//!   playlist-bridge dry-run <tracks.json> --catalog <catalog.json>
//!   playlist-bridge config
//!   playlist-bridge --help

use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        cli::print_help();
        return Ok(());
    }

    match cli::parse_args(&args) {
        Ok((command, options)) => {
            init_logging(options.verbose);
            cli::run(command, options).await
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            cli::print_help();
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    // Stdout carries results, so logs go to stderr
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
