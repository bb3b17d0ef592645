//! On-disk directory layout for the dashboard.
//!
//! The dashboard expects its data, cache, export, and asset directories
//! to exist before it starts. Creation is idempotent: directories that
//! already exist are reported, not recreated, and never an error.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// What the layout step did, for status output.
#[derive(Debug, Clone, Default)]
pub struct LayoutReport {
    /// Directories created by this run.
    pub created: Vec<PathBuf>,
    /// Directories that already existed.
    pub existing: Vec<PathBuf>,
}

impl LayoutReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.existing.len()
    }
}

/// Create every directory in `dirs`, including missing parents.
pub fn create_layout<P: AsRef<Path>>(dirs: &[P]) -> Result<LayoutReport> {
    let mut report = LayoutReport::default();

    for dir in dirs {
        let path = dir.as_ref();
        if path.is_dir() {
            log::debug!("directory already present: {}", path.display());
            report.existing.push(path.to_path_buf());
        } else {
            fs::create_dir_all(path)?;
            log::info!("created directory: {}", path.display());
            report.created.push(path.to_path_buf());
        }
    }

    Ok(report)
}
