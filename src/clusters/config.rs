use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Site cluster configuration
///
/// Only the extra module paths matter here: clusters that prepend additional
/// module paths on top of their own. Entries keep their file order.
///
/// ```yaml
/// clusters:
///   - name: doduo
///     extra_modulepaths:
///       - /apps/gent/RHEL8/zen2-ib/modules/all
///       - /apps/gent/RHEL8/zen2-ib/modules/extra
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub name: String,

    /// Module paths in the order they are prepended to `$MODULEPATH`
    #[serde(default)]
    pub extra_modulepaths: Vec<String>,
}

impl ClusterConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            field: "cluster configuration".to_string(),
            error: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Extra module paths per entry, each list in prepend order
    pub fn extra_modulepaths(&self) -> impl Iterator<Item = &[String]> {
        self.clusters.iter().map(|c| c.extra_modulepaths.as_slice())
    }
}
