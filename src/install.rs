//! Dependency installation into the virtual environment.
//!
//! Runs the environment's `pip install -r <manifest>` with streamed
//! output. Installation failure is fatal to the bootstrap: the installer's
//! exit code is preserved and becomes the launcher's exit status.

use crate::command::run_streamed;
use crate::error::{LaunchError, Result};
use crate::venv::Venv;
use std::path::Path;
use std::process::Command;

/// Install every manifest entry into the environment.
pub fn install_dependencies(venv: &Venv, manifest_path: &Path) -> Result<()> {
    let pip = venv.pip();
    if !pip.is_file() {
        return Err(LaunchError::environment(format!(
            "pip not found at {} (is the virtual environment intact?)",
            pip.display()
        )));
    }

    let mut cmd = Command::new(pip);
    cmd.arg("install").arg("-r").arg(manifest_path);

    let output = run_streamed(cmd, "pip install")
        .map_err(|e| LaunchError::install(format!("{:#}", e), 1))?;

    if output.success {
        Ok(())
    } else {
        let code = output.exit_code.unwrap_or(1);
        Err(LaunchError::install(
            format!("pip exited with code {}", code),
            code,
        ))
    }
}
