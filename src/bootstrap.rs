//! Bootstrap orchestration.
//!
//! Runs the launch sequence strictly in order: environment, dependencies,
//! directory layout, market-data probe, dashboard server. Environment,
//! install, and launch failures abort the run; the probe only decides
//! whether the status output announces live or synthetic data.

use crate::config::LauncherConfig;
use crate::error::Result;
use crate::layout::create_layout;
use crate::manifest::Manifest;
use crate::probe::{ProbeOutcome, probe_market_data};
use crate::venv::{EnsureOutcome, Venv};
use crate::{dashboard, install};
use std::time::Duration;

/// Orchestrates the bootstrap sequence.
pub struct Bootstrap {
    config: LauncherConfig,
    dry_run: bool,
}

impl Bootstrap {
    pub fn new(config: LauncherConfig, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    fn venv(&self) -> Venv {
        Venv::new(&self.config.venv_dir, &self.config.python_bin)
    }

    /// Run the full sequence and block on the dashboard server.
    pub fn run(&self) -> Result<()> {
        self.setup()?;
        self.probe();
        self.launch()
    }

    /// Steps 1-4: environment, dependencies, directory layout.
    pub fn setup(&self) -> Result<()> {
        println!("🔧 Preparing MASI dashboard environment...");

        // Step 1+2: isolated environment and its tool paths
        let venv = self.venv();
        if self.dry_run && !venv.exists() {
            println!(
                "→ dry-run: would create virtual environment at {}",
                venv.root().display()
            );
        } else {
            match venv.ensure()? {
                EnsureOutcome::Created => println!(
                    "✓ Virtual environment created at {}",
                    venv.root().display()
                ),
                EnsureOutcome::AlreadyPresent => println!("✓ Virtual environment present"),
            }
        }

        // Step 3: dependency installation. Parse the manifest first so a
        // malformed file aborts before pip runs.
        let manifest = Manifest::load(&self.config.manifest_path)?;
        log::info!(
            "manifest {} lists {} package(s)",
            self.config.manifest_path.display(),
            manifest.len()
        );
        if self.dry_run {
            println!(
                "→ dry-run: would install {} package(s) from {}",
                manifest.len(),
                self.config.manifest_path.display()
            );
        } else {
            install::install_dependencies(&venv, &self.config.manifest_path)?;
            println!("✓ Dependencies installed ({} package(s))", manifest.len());
        }

        // Step 4: directory layout
        if self.dry_run {
            println!(
                "→ dry-run: would create {} data/asset directories",
                self.config.layout_dirs().len()
            );
        } else {
            let report = create_layout(&self.config.layout_dirs())?;
            println!(
                "✓ Directory layout ready ({} created, {} already present)",
                report.created.len(),
                report.existing.len()
            );
        }

        Ok(())
    }

    /// Step 5: best-effort market-data probe. Never fails.
    pub fn probe(&self) -> ProbeOutcome {
        println!(
            "🔍 Checking market data service at {}:{}...",
            self.config.market_data_host, self.config.market_data_port
        );

        let outcome = probe_market_data(
            &self.config.market_data_host,
            self.config.market_data_port,
            Duration::from_secs(self.config.probe_timeout_secs),
        );

        match &outcome {
            ProbeOutcome::Live => {
                println!("✓ Market data service reachable, live data available");
            }
            ProbeOutcome::Synthetic { reason } => {
                println!("⚠ Market data service unreachable, using synthetic data ({})", reason);
            }
        }

        outcome
    }

    /// Step 6: announce the URL and start the dashboard server.
    pub fn launch(&self) -> Result<()> {
        println!("🚀 Starting dashboard server...");
        for line in self.access_banner() {
            println!("{}", line);
        }

        if self.dry_run {
            println!("→ dry-run: dashboard server not started");
            return Ok(());
        }

        dashboard::launch(&self.venv(), &self.config)
    }

    /// Access instructions printed before the server takes the foreground.
    pub fn access_banner(&self) -> Vec<String> {
        vec![
            format!("   Open {} in your browser", self.config.dashboard_url()),
            "   Use the sidebar to navigate between dashboard pages".to_string(),
        ]
    }
}
