use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(cansat_cli::log_filter(cansat_cli::TERMINAL_LOG_LEVEL))
        .with_writer(std::io::stderr)
        .init();
    cansat_cli::main_inner(cansat_cli::Args::parse())
}
