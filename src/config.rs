//! Launcher configuration handling for saving and loading settings.
//!
//! All knobs the bootstrap sequence uses live here: where the virtual
//! environment goes, which manifest to install, where the data directories
//! are rooted, and the market-data / dashboard endpoints. Defaults match
//! the dashboard's stock deployment (Bloomberg endpoint on localhost:8194,
//! Streamlit on port 8501).

use crate::error::{LaunchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directories the dashboard expects to exist, relative to the data root.
pub const LAYOUT_DIRS: &[&str] = &[
    "data/historical",
    "data/cache",
    "data/exports",
    "components",
    "utils",
    "pages",
    "assets",
];

/// Launcher configuration that can be saved/loaded as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Virtual environment directory.
    pub venv_dir: PathBuf,
    /// Interpreter used to create the virtual environment.
    pub python_bin: String,
    /// Dependency manifest consumed by the install step.
    pub manifest_path: PathBuf,
    /// Root under which the data/asset directories are created.
    pub data_root: PathBuf,

    // Market data service (Bloomberg blpapi endpoint)
    pub market_data_host: String,
    pub market_data_port: u16,
    /// Probe timeout in seconds.
    pub probe_timeout_secs: u64,

    // Dashboard server
    pub dashboard_entrypoint: PathBuf,
    pub dashboard_port: u16,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            venv_dir: PathBuf::from("venv"),
            python_bin: "python3".to_string(),
            manifest_path: PathBuf::from("requirements.txt"),
            data_root: PathBuf::from("."),
            market_data_host: "localhost".to_string(),
            market_data_port: 8194,
            probe_timeout_secs: 3,
            dashboard_entrypoint: PathBuf::from("Main.py"),
            dashboard_port: 8501,
        }
    }
}

impl LauncherConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LaunchError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.venv_dir.as_os_str().is_empty() {
            return Err(LaunchError::config("venv_dir must be specified"));
        }
        if self.python_bin.trim().is_empty() {
            return Err(LaunchError::config("python_bin must be specified"));
        }
        if self.manifest_path.as_os_str().is_empty() {
            return Err(LaunchError::config("manifest_path must be specified"));
        }
        if self.dashboard_entrypoint.as_os_str().is_empty() {
            return Err(LaunchError::config("dashboard_entrypoint must be specified"));
        }
        if self.market_data_host.trim().is_empty() {
            return Err(LaunchError::config("market_data_host must be specified"));
        }
        if self.market_data_port == 0 {
            return Err(LaunchError::config("market_data_port must be non-zero"));
        }
        if self.dashboard_port == 0 {
            return Err(LaunchError::config("dashboard_port must be non-zero"));
        }
        if self.probe_timeout_secs == 0 || self.probe_timeout_secs > 60 {
            return Err(LaunchError::config(
                "probe_timeout_secs must be between 1 and 60",
            ));
        }
        Ok(())
    }

    /// Full paths of the directories the layout step creates.
    pub fn layout_dirs(&self) -> Vec<PathBuf> {
        LAYOUT_DIRS
            .iter()
            .map(|dir| self.data_root.join(dir))
            .collect()
    }

    /// Local URL the dashboard serves on once launched.
    pub fn dashboard_url(&self) -> String {
        format!("http://localhost:{}", self.dashboard_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LauncherConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_endpoints() {
        let config = LauncherConfig::default();
        assert_eq!(config.market_data_host, "localhost");
        assert_eq!(config.market_data_port, 8194);
        assert_eq!(config.dashboard_url(), "http://localhost:8501");
    }

    #[test]
    fn test_layout_dirs_rooted_at_data_root() {
        let config = LauncherConfig {
            data_root: PathBuf::from("/srv/masi"),
            ..Default::default()
        };
        let dirs = config.layout_dirs();
        assert_eq!(dirs.len(), 7);
        assert!(dirs.contains(&PathBuf::from("/srv/masi/data/historical")));
        assert!(dirs.contains(&PathBuf::from("/srv/masi/assets")));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LauncherConfig::default();
        config.dashboard_port = 0;
        assert!(config.validate().is_err());

        let mut config = LauncherConfig::default();
        config.probe_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = LauncherConfig::default();
        config.python_bin = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");

        let mut config = LauncherConfig::default();
        config.market_data_host = "bbg.internal".to_string();
        config.probe_timeout_secs = 10;
        config.save_to_file(&path).unwrap();

        let loaded = LauncherConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.market_data_host, "bbg.internal");
        assert_eq!(loaded.probe_timeout_secs, 10);
        assert_eq!(loaded.dashboard_port, 8501);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "market_data_port": 9194 }"#).unwrap();

        let loaded = LauncherConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.market_data_port, 9194);
        assert_eq!(loaded.venv_dir, PathBuf::from("venv"));
    }
}
