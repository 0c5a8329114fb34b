//! traefik-opnsense-sync
//!
//! Mirrors the hostnames routed by Traefik into OPNsense Unbound host
//! aliases.
//!
//! # Architecture Overview
//!
//! ```text
//!   Traefik API ──routers──┐
//!                          ▼
//!                 ┌─────────────────┐      ┌──────────────┐
//!                 │ routing (parse, │ ───▶ │   domains    │ ◀── exrex
//!                 │ extract hosts)  │      │ (materialize)│
//!                 └─────────────────┘      └──────┬───────┘
//!                                                 ▼
//!   OPNsense API ──aliases──▶ ┌────────────────────────────┐
//!                             │ sync engine (filter, diff) │
//!                             └─────────────┬──────────────┘
//!                                           ▼
//!                             ┌────────────────────────────┐
//!   OPNsense API ◀─create/del─│  executor (+ reconfigure)  │
//!                             └────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use traefik_opnsense_sync::config::loader::{env_lookup, load_from, resolve_config_source};
use traefik_opnsense_sync::lifecycle::{build_reconciler, signals, Shutdown};
use traefik_opnsense_sync::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "traefik-opnsense-sync", version)]
#[command(
    about = "Sync Traefik router hostnames into OPNsense Unbound host aliases",
    long_about = None
)]
struct Args {
    /// Path to the TOML config file (defaults to $TOS_CONFIG, then ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log planned changes without applying them, then exit
    #[arg(long)]
    dry_run: bool,

    /// Run a single sync cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let source = resolve_config_source(args.config.as_deref(), env_lookup);
    let config = match logging::bootstrap(|| load_from(&source, env_lookup)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("traefik-opnsense-sync: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %source.path().display(),
        "traefik-opnsense-sync starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let dry_run = args.dry_run || config.dry_run;
    let reconciler = match build_reconciler(&config, dry_run) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    let signal_task = signals::spawn_signal_handler(shutdown);

    let result = reconciler.run(shutdown_rx, args.once).await;
    signal_task.abort();

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            ExitCode::FAILURE
        }
    }
}
