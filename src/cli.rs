use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MASI dashboard launcher - bootstrap and start the sentiment dashboard
#[derive(Parser)]
#[command(name = "masi-launcher")]
#[command(about = "Bootstrap launcher for the MASI market sentiment dashboard")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: show what each step would do without making changes.
    ///
    /// Side-effecting steps (environment creation, dependency install,
    /// directory creation, server launch) are skipped and logged. The
    /// read-only market-data probe still executes so the preview is
    /// realistic.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Path to a launcher configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full bootstrap sequence and start the dashboard (default)
    Run,
    /// Prepare the environment only: virtualenv, dependencies, directories
    Setup,
    /// Check market-data reachability and report live vs synthetic mode
    Probe,
    /// Validate a dependency manifest
    Validate {
        /// Path to the manifest to validate
        manifest: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_no_args() {
        // Running with no args should succeed (defaults to the full sequence)
        let result = Cli::try_parse_from(["masi-launcher"]);
        assert!(result.is_ok());
        let cli = result.unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_run_with_dry_run() {
        let cli = Cli::try_parse_from(["masi-launcher", "run", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Some(Commands::Run)));
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli =
            Cli::try_parse_from(["masi-launcher", "--config", "/etc/masi/launcher.json", "setup"])
                .unwrap();
        assert_eq!(
            cli.config.unwrap().to_str().unwrap(),
            "/etc/masi/launcher.json"
        );
        assert!(matches!(cli.command, Some(Commands::Setup)));
    }

    #[test]
    fn test_cli_validate_command() {
        let cli = Cli::try_parse_from(["masi-launcher", "validate", "requirements.txt"]).unwrap();
        match cli.command {
            Some(Commands::Validate { manifest }) => {
                assert_eq!(manifest.to_str().unwrap(), "requirements.txt");
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_probe_command() {
        let cli = Cli::try_parse_from(["masi-launcher", "probe"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Probe)));
    }
}
