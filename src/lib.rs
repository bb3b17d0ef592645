//! MASI Dashboard Launcher Library
//!
//! One-shot bootstrap for the MASI market sentiment dashboard: prepare an
//! isolated Python environment, install the dashboard's dependencies,
//! create its on-disk layout, probe the market-data service, and start
//! the Streamlit server in the foreground.

pub mod bootstrap;
pub mod cli;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod install;
pub mod layout;
pub mod manifest;
pub mod preflight;
pub mod probe;
pub mod process_guard;
pub mod venv;

// Re-export main types for convenience
pub use bootstrap::Bootstrap;
pub use config::{LAYOUT_DIRS, LauncherConfig};
pub use error::{LaunchError, Result};
pub use layout::{LayoutReport, create_layout};
pub use manifest::{Manifest, Requirement, VersionOp};
pub use probe::{ProbeOutcome, probe_market_data};
pub use process_guard::{ProcessGroupExt, ProcessGuard, ProcessRegistry};
pub use venv::{EnsureOutcome, Venv};
