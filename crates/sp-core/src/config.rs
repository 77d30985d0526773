//! Configuration types and parsing for seedplan.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "seedplan.yml";

/// Run configuration from seedplan.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seed for the random source; omit for a fresh seed every run
    #[serde(default)]
    pub seed: Option<u64>,

    /// What migration does with a reference it cannot remap
    #[serde(default)]
    pub unmapped_references: UnmappedReferencePolicy,

    /// How pairwise reference cycles are broken
    #[serde(default)]
    pub break_cycles: CycleStrategy,

    /// Where to write the JSON run report
    #[serde(default)]
    pub report_path: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
            message: e.to_string(),
        })
    }

    /// Load `seedplan.yml` from a directory, falling back to defaults when absent
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    /// Report path resolved against a base directory
    pub fn report_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.report_path.as_ref().map(|p| {
            let path = Path::new(p);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        })
    }
}

/// Handling of a migrated reference whose target id is unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedReferencePolicy {
    /// Insert the source-side id unchanged
    #[default]
    PassThrough,
    /// Set the field to null
    NullOut,
    /// Do not submit the record; report it as failed
    Reject,
}

impl fmt::Display for UnmappedReferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmappedReferencePolicy::PassThrough => write!(f, "pass_through"),
            UnmappedReferencePolicy::NullOut => write!(f, "null_out"),
            UnmappedReferencePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// How the cycle resolver picks an edge to drop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStrategy {
    /// Ask on the terminal
    #[default]
    Prompt,
    /// Drop the first candidate edge without asking
    First,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
