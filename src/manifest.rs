//! Dependency manifest parsing.
//!
//! The dashboard declares its packages in a flat `requirements.txt`-style
//! file: one package per line, optionally pinned with a version constraint
//! (`streamlit>=1.28`, `blpapi==3.19.1`). Blank lines and `#` comments are
//! ignored. The launcher parses the manifest before handing it to the
//! installer so a malformed file aborts the run early, with a line number.

use crate::error::{LaunchError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Version comparison operator in a requirement entry.
///
/// Two-character operators must be matched before single-character ones
/// when parsing, otherwise `>=` would be read as `>` followed by `=1.28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOp {
    /// `==` exact pin
    Exact,
    /// `>=` minimum version
    AtLeast,
    /// `<=` maximum version
    AtMost,
    /// `>` strictly greater
    Greater,
    /// `<` strictly less
    Less,
    /// `~=` compatible release
    Compatible,
    /// `!=` exclusion
    Exclude,
}

impl VersionOp {
    /// Operators ordered longest-first for greedy matching.
    pub const ALL: &'static [VersionOp] = &[
        VersionOp::Exact,
        VersionOp::AtLeast,
        VersionOp::AtMost,
        VersionOp::Compatible,
        VersionOp::Exclude,
        VersionOp::Greater,
        VersionOp::Less,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOp::Exact => "==",
            VersionOp::AtLeast => ">=",
            VersionOp::AtMost => "<=",
            VersionOp::Greater => ">",
            VersionOp::Less => "<",
            VersionOp::Compatible => "~=",
            VersionOp::Exclude => "!=",
        }
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VersionOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        VersionOp::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown version operator '{}'", s))
    }
}

/// A single package entry from the dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Package name as it appears in the manifest.
    pub name: String,
    /// Optional version constraint (operator, version).
    pub constraint: Option<(VersionOp, String)>,
}

impl Requirement {
    fn valid_name(name: &str) -> bool {
        !name.is_empty()
            && name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '[' | ']'))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some((op, version)) => write!(f, "{}{}{}", self.name, op, version),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for Requirement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let entry = s.trim();
        if entry.is_empty() {
            return Err("empty requirement".to_string());
        }

        for op in VersionOp::ALL {
            if let Some(idx) = entry.find(op.as_str()) {
                let name = entry[..idx].trim();
                let version = entry[idx + op.as_str().len()..].trim();
                if !Requirement::valid_name(name) {
                    return Err(format!("invalid package name '{}'", name));
                }
                if version.is_empty() {
                    return Err(format!("missing version after '{}'", op));
                }
                if !version
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '*'))
                {
                    return Err(format!("invalid version '{}'", version));
                }
                return Ok(Requirement {
                    name: name.to_string(),
                    constraint: Some((*op, version.to_string())),
                });
            }
        }

        if !Requirement::valid_name(entry) {
            return Err(format!("invalid package name '{}'", entry));
        }
        Ok(Requirement {
            name: entry.to_string(),
            constraint: None,
        })
    }
}

/// Parsed dependency manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub requirements: Vec<Requirement>,
}

impl Manifest {
    /// Parse manifest text. Malformed lines are errors carrying the
    /// 1-based line number of the offending entry.
    pub fn parse(input: &str) -> Result<Self> {
        let mut requirements = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            // Strip trailing comments before parsing
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let requirement = line.parse::<Requirement>().map_err(|reason| {
                LaunchError::manifest(format!("line {}: {}", idx + 1, reason))
            })?;
            requirements.push(requirement);
        }

        Ok(Manifest { requirements })
    }

    /// Load and parse a manifest file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LaunchError::manifest(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}
