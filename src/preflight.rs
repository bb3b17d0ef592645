//! Pre-flight sanity checks for the runtime environment.
//!
//! Verifies the configured Python interpreter is on PATH before any
//! side-effecting step runs: without it, environment creation cannot
//! succeed, and that failure is fatal. Checks can be skipped for
//! development via `MASI_LAUNCHER_SKIP_PREFLIGHT=1`.

use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};
use crate::process_guard::ProcessGroupExt;
use std::process::Command;

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .in_own_process_group()
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Skip preflight (for development/testing)
fn should_skip() -> bool {
    std::env::var("MASI_LAUNCHER_SKIP_PREFLIGHT")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Verify the environment before the bootstrap sequence starts.
pub fn run_preflight(config: &LauncherConfig) -> Result<()> {
    if should_skip() {
        log::warn!("preflight checks skipped (MASI_LAUNCHER_SKIP_PREFLIGHT=1)");
        return Ok(());
    }

    log::debug!("running pre-flight checks");

    if !binary_exists(&config.python_bin) {
        return Err(LaunchError::environment(format!(
            "{} not found on PATH; install Python 3 (e.g. apt install python3 python3-venv) and retry",
            config.python_bin
        )));
    }

    log::info!("pre-flight checks passed: {} available", config.python_bin);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_exists_bash() {
        // bash should always exist
        assert!(binary_exists("bash"), "bash should be available");
    }

    #[test]
    fn test_binary_exists_nonexistent() {
        assert!(!binary_exists("this_binary_definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_missing_interpreter_is_fatal() {
        let config = LauncherConfig {
            python_bin: "this_python_definitely_does_not_exist_12345".to_string(),
            ..Default::default()
        };
        let err = run_preflight(&config).unwrap_err();
        assert!(matches!(err, LaunchError::Environment(_)));
    }
}
