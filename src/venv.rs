//! Isolated dependency environment (Python virtual environment).
//!
//! The dashboard's packages are installed into a self-contained
//! environment under a fixed directory, never into the system
//! installation. "Activation" here is path resolution: later steps run
//! the interpreter and tools from inside the environment's `bin/`
//! directory instead of mutating the shell's PATH.

use crate::error::{LaunchError, Result};
use crate::process_guard::ProcessGroupExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Outcome of ensuring the environment exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The environment was created by this run.
    Created,
    /// The environment already existed; nothing was done.
    AlreadyPresent,
}

/// Handle to the virtual environment directory.
#[derive(Debug, Clone)]
pub struct Venv {
    root: PathBuf,
    python_bin: String,
}

impl Venv {
    pub fn new(root: impl Into<PathBuf>, python_bin: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            python_bin: python_bin.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// An environment counts as present when its marker file exists.
    /// A bare directory without `pyvenv.cfg` is treated as absent so a
    /// half-created environment gets rebuilt.
    pub fn exists(&self) -> bool {
        self.root.join("pyvenv.cfg").is_file()
    }

    /// Create the environment if absent. Idempotent: a second run on an
    /// existing environment is a no-op, never an error.
    pub fn ensure(&self) -> Result<EnsureOutcome> {
        if self.exists() {
            log::debug!("virtual environment already present at {}", self.root.display());
            return Ok(EnsureOutcome::AlreadyPresent);
        }

        log::info!("creating virtual environment at {}", self.root.display());
        let output = Command::new(&self.python_bin)
            .arg("-m")
            .arg("venv")
            .arg(&self.root)
            .in_own_process_group()
            .output()
            .map_err(|e| {
                LaunchError::environment(format!("failed to run {}: {}", self.python_bin, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LaunchError::environment(format!(
                "virtual environment creation failed: {}",
                stderr.trim()
            )));
        }

        Ok(EnsureOutcome::Created)
    }

    fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Interpreter inside the environment.
    pub fn python(&self) -> PathBuf {
        self.bin_dir().join("python")
    }

    /// Package installer inside the environment.
    pub fn pip(&self) -> PathBuf {
        self.bin_dir().join("pip")
    }

    /// Dashboard server entry point, installed by the dependency step.
    pub fn streamlit(&self) -> PathBuf {
        self.bin_dir().join("streamlit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_paths() {
        let venv = Venv::new("venv", "python3");
        assert_eq!(venv.python(), PathBuf::from("venv/bin/python"));
        assert_eq!(venv.pip(), PathBuf::from("venv/bin/pip"));
        assert_eq!(venv.streamlit(), PathBuf::from("venv/bin/streamlit"));
    }

    #[test]
    fn test_ensure_is_noop_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("venv");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();

        let venv = Venv::new(&root, "python3");
        assert!(venv.exists());
        assert_eq!(venv.ensure().unwrap(), EnsureOutcome::AlreadyPresent);
        // Second run must not error either
        assert_eq!(venv.ensure().unwrap(), EnsureOutcome::AlreadyPresent);
    }

    #[test]
    fn test_bare_directory_is_not_an_environment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("venv");
        std::fs::create_dir_all(&root).unwrap();

        let venv = Venv::new(&root, "python3");
        assert!(!venv.exists());
    }

    #[test]
    fn test_ensure_fails_with_missing_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("venv");

        let venv = Venv::new(&root, "this_python_definitely_does_not_exist_12345");
        let err = venv.ensure().unwrap_err();
        assert!(matches!(err, LaunchError::Environment(_)));
    }
}
