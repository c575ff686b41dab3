//! fnhostd — the fnhost daemon.
//!
//! Assembles the host-side pieces that sit in front of language workers:
//! - Dispatcher state cell
//! - Invocation admission gate
//! - Scale option resolution + scale monitor service
//!
//! # Usage
//!
//! ```text
//! fnhostd run --config /etc/fnhost/host.toml
//! fnhostd scale --config /etc/fnhost/host.toml
//! ```
//!
//! `run` exits non-zero when the admission gate requests a host stop, so
//! the process supervisor restarts it with fresh workers.

mod host;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use fnhost_core::{HostConfig, SystemEnvironment};

#[derive(Parser)]
#[command(name = "fnhostd", about = "fnhost daemon")]
struct Cli {
    /// Path to host.toml. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the host until Ctrl-C or until admission requests a stop.
    Run,
    /// Resolve scale options, report them, and exit.
    Scale,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fnhostd=debug,fnhost=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = HostConfig::load(cli.config.as_deref())?;
    let env = SystemEnvironment;

    match cli.command {
        Command::Run => {
            let host = host::Host::build(&config, &env)?;
            let exit = host
                .run(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "failed to listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                    info!("shutdown signal received");
                })
                .await?;
            if exit == host::HostExit::StopRequested {
                anyhow::bail!("host stopped: dispatcher never became ready");
            }
            Ok(())
        }
        Command::Scale => {
            let options = host::report_scale(&config, &env)?;
            println!("{}", serde_json::to_string_pretty(&options)?);
            Ok(())
        }
    }
}
