//! Dashboard server launch.
//!
//! The final bootstrap step: start the Streamlit server in the foreground
//! and block until it exits. The child runs in its own process group,
//! tracked by the global registry, so interrupting the launcher stops the
//! server instead of orphaning it. Output is inherited so the server
//! writes straight to the operator's terminal.

use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};
use crate::process_guard::{ProcessGroupExt, ProcessRegistry};
use crate::venv::Venv;
use std::process::Command;

/// Launch the dashboard server and wait for it to exit.
///
/// Exit status mapping: code 0 → `Ok`; non-zero code → `Launch` error
/// propagating that code; killed by signal → `Ok` (operator interrupt
/// is a clean stop, not a launch failure).
pub fn launch(venv: &Venv, config: &LauncherConfig) -> Result<()> {
    let streamlit = venv.streamlit();
    if !streamlit.is_file() {
        return Err(LaunchError::launch(
            format!(
                "streamlit not found at {} (is it listed in {}?)",
                streamlit.display(),
                config.manifest_path.display()
            ),
            1,
        ));
    }

    let mut cmd = Command::new(&streamlit);
    cmd.arg("run")
        .arg(&config.dashboard_entrypoint)
        .arg("--server.port")
        .arg(config.dashboard_port.to_string())
        .in_own_process_group();

    log::info!(
        "starting dashboard server: {} run {} --server.port {}",
        streamlit.display(),
        config.dashboard_entrypoint.display(),
        config.dashboard_port
    );

    let mut child = cmd.spawn().map_err(|e| {
        LaunchError::launch(format!("failed to start {}: {}", streamlit.display(), e), 1)
    })?;
    let pid = child.id();

    {
        let registry = ProcessRegistry::global();
        let mut guard = registry.lock().expect("process registry mutex poisoned");
        guard.track(pid, "dashboard server");
    }

    let status = child.wait().map_err(|e| {
        LaunchError::launch(format!("failed waiting for dashboard server: {}", e), 1)
    })?;

    {
        let registry = ProcessRegistry::global();
        let mut guard = registry.lock().expect("process registry mutex poisoned");
        guard.release(pid);
    }

    match status.code() {
        Some(0) => {
            log::info!("dashboard server stopped");
            Ok(())
        }
        Some(code) => Err(LaunchError::launch(
            format!("dashboard server exited with code {}", code),
            code,
        )),
        None => {
            // Terminated by signal: the operator (or our own signal
            // handler) stopped it.
            log::info!("dashboard server terminated by signal");
            Ok(())
        }
    }
}
