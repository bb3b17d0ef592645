//! MASI dashboard launcher - main entry point
//!
//! Sequential one-shot bootstrap: environment, dependencies, directories,
//! market-data probe, then the dashboard server in the foreground.

use log::{debug, error, info};

use masi_launcher::bootstrap::Bootstrap;
use masi_launcher::cli::{Cli, Commands};
use masi_launcher::config::LauncherConfig;
use masi_launcher::error::Result;
use masi_launcher::manifest::Manifest;
use masi_launcher::probe::ProbeOutcome;
use masi_launcher::{preflight, process_guard};

/// Initialize the logger with appropriate settings
fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env() // Allows RUST_LOG env var to override
        .init();
}

fn main() {
    // Initialize logging first
    init_logger();
    info!("MASI dashboard launcher starting up");

    // Signal handlers so an interrupted run never orphans pip or the
    // dashboard server
    if let Err(e) = process_guard::install_signal_handlers() {
        log::warn!("Failed to install signal handlers: {}", e);
        // Continue anyway - cleanup still runs via Drop
    }
    debug!("Signal handlers installed");

    let cli = Cli::parse_args();

    // Held for the whole run: stops the active child on every exit path
    let _guard = process_guard::ProcessGuard::new();

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading launcher configuration from {:?}", path);
            LauncherConfig::load_from_file(path)?
        }
        None => LauncherConfig::default(),
    };
    config.validate()?;

    match cli.command {
        None | Some(Commands::Run) => {
            preflight::run_preflight(&config)?;
            Bootstrap::new(config, cli.dry_run).run()
        }
        Some(Commands::Setup) => {
            preflight::run_preflight(&config)?;
            Bootstrap::new(config, cli.dry_run).setup()
        }
        Some(Commands::Probe) => {
            // Capability report only: both outcomes exit 0
            match Bootstrap::new(config, cli.dry_run).probe() {
                ProbeOutcome::Live => info!("probe outcome: live"),
                ProbeOutcome::Synthetic { reason } => {
                    info!("probe outcome: synthetic ({})", reason)
                }
            }
            Ok(())
        }
        Some(Commands::Validate { manifest }) => {
            let parsed = Manifest::load(&manifest)?;
            println!(
                "✓ Manifest is valid: {} ({} package(s))",
                manifest.display(),
                parsed.len()
            );
            Ok(())
        }
    }
}
