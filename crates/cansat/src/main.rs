//! CanSat - rail-launched CanSat flight simulator

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cansat")]
#[command(about = "CanSat flight simulator with terminal and web front-ends")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for parameters, write the plots to a PNG and show them
    Terminal {
        /// Pass remaining arguments to cansat-cli (e.g. `--defaults --no-show`)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Serve the results page over HTTP
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value_t = 5001)]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,

        /// Log at debug level
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Some(Commands::Serve { debug: true, .. }) => "debug",
        Some(Commands::Serve { .. }) => "info",
        Some(Commands::Terminal { .. }) | None => cansat_cli::TERMINAL_LOG_LEVEL,
    };
    init_logging(level);

    match cli.command {
        Some(Commands::Terminal { args }) => {
            let cli_args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
            run_terminal(&cli_args)
        }
        Some(Commands::Serve { port, host, .. }) => run_server(port, &host),
        None => run_terminal(&[]),
    }
}

/// `RUST_LOG` wins over the default level.
fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(cansat_cli::log_filter(default_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_terminal(args: &[&str]) -> anyhow::Result<()> {
    let mut full_args = vec!["cansat-cli"];
    full_args.extend(args);
    cansat_cli::run_cli_main(&full_args)
}

fn run_server(port: u16, host: &str) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tokio::runtime::Runtime;
    let rt = Runtime::new()?;
    rt.block_on(async {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {host}:{port}"))?;
        let app = cansat_web::create_router();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        println!("listening on http://{}", addr);
        tracing::info!("web server started on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["cansat", "serve"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port, host, debug }) => {
                assert_eq!(port, 5001);
                assert_eq!(host, "0.0.0.0");
                assert!(!debug);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_terminal_passes_flags_through() {
        let cli = Cli::try_parse_from(["cansat", "terminal", "--defaults", "-o", "plots"]).unwrap();
        match cli.command {
            Some(Commands::Terminal { args }) => assert_eq!(args, ["--defaults", "-o", "plots"]),
            _ => panic!("expected terminal"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        assert!(Cli::try_parse_from(["cansat"]).unwrap().command.is_none());
    }
}
