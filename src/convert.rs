//! One conversion run: spider dump in, modulemap out

use crate::clusters::{resolve_clusters, sequence_modulepaths, ClusterConfig, ClusterMap};
use crate::config::ModmapConfig;
use crate::error::Result;
use crate::lmod::LmodTables;
use crate::software::{build_software_map, SoftwareMap};
use crate::store::write_modulemap;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Summary of a conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub clusters: usize,
    pub packages: usize,
    /// Distinct (package, version) pairs
    pub total_modules: usize,
}

impl ConversionStats {
    pub fn from_maps(clusters: &ClusterMap, software: &SoftwareMap) -> Self {
        Self {
            clusters: clusters.len(),
            packages: software.len(),
            total_modules: software.values().map(|p| p.versions.len()).sum(),
        }
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} clusters, {} packages, {} modules",
            self.clusters, self.packages, self.total_modules
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub clusters: ClusterMap,
    pub software: SoftwareMap,
    pub stats: ConversionStats,
}

/// Resolves clusters, orders module paths and builds the software map
pub fn convert_tables(tables: &LmodTables, cluster_config: &ClusterConfig) -> Result<Conversion> {
    let index = resolve_clusters(&tables.mpath_map)?;
    let modulepaths = sequence_modulepaths(tables.spider.keys(), &index.modulepaths, cluster_config);
    let software = build_software_map(&tables.spider, &index.modulepaths, &modulepaths)?;

    let stats = ConversionStats::from_maps(&index.clusters, &software);
    Ok(Conversion {
        clusters: index.clusters,
        software,
        stats,
    })
}

/// Converts the spider dump at `input` and writes the modulemap to `output`
pub fn convert_file(
    input: &Path,
    output: &Path,
    cluster_config: &ClusterConfig,
) -> Result<ConversionStats> {
    let tables = LmodTables::load(input)?;
    let conversion = convert_tables(&tables, cluster_config)?;

    write_modulemap(output, &conversion.clusters, &conversion.software)?;
    info!(
        "Converted {} into {}: {}",
        input.display(),
        output.display(),
        conversion.stats
    );
    Ok(conversion.stats)
}

/// Converts the spider dump in the cache directory and writes the modulemap
pub fn convert_cache(config: &ModmapConfig) -> Result<ConversionStats> {
    let cluster_config = config.load_cluster_config()?;
    convert_file(
        &config.spider_path(),
        &config.modulemap_path(),
        &cluster_config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModmapError;
    use crate::store::read_modulemap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const DUMP: &str = r#"{
        "mpathMapT": {
            "/apps/joltik/modules": {"cluster/joltik": "/etc/cluster/joltik"},
            "/apps/skitty/modules": {"cluster/.skitty": "/etc/cluster/skitty"},
            "/etc/cluster": []
        },
        "spiderT": {
            "/apps/joltik/modules": {
                "GCC": {
                    "fileT": {
                        "GCC/8.2.0": {"Version": "8.2.0", "canonical": "8.2.0"},
                        "GCC/10.1.0": {"Version": "10.1.0", "canonical": "10.1.0"}
                    },
                    "defaultT": []
                }
            },
            "/apps/skitty/modules": {
                "GCC": {
                    "fileT": {
                        "GCC/8.2.0": {"Version": "8.2.0", "canonical": "8.2.0"}
                    },
                    "defaultT": {"value": "GCC/8.2.0"}
                },
                "Bazel": {
                    "fileT": {
                        "Bazel/0.26.1": {"Version": "0.26.1", "canonical": "0.26.1"}
                    }
                }
            },
            "version": 5
        }
    }"#;

    #[test]
    fn test_convert_tables() {
        let tables = LmodTables::from_json_str(DUMP).unwrap();
        let conversion = convert_tables(&tables, &ClusterConfig::default()).unwrap();

        assert_eq!(conversion.clusters["joltik"], "cluster/joltik");
        assert_eq!(conversion.clusters["skitty"], "cluster/.skitty");

        let gcc = &conversion.software["GCC"];
        assert_eq!(gcc.defaults["joltik"], "10.1.0");
        assert_eq!(gcc.defaults["skitty"], "8.2.0");
        assert_eq!(gcc.versions["8.2.0"], vec!["joltik", "skitty"]);
        assert_eq!(gcc.versions["10.1.0"], vec!["joltik"]);

        assert_eq!(
            conversion.stats,
            ConversionStats {
                clusters: 2,
                packages: 2,
                total_modules: 3,
            }
        );
    }

    #[test]
    fn test_stats_display() {
        let stats = ConversionStats {
            clusters: 3,
            packages: 10,
            total_modules: 42,
        };
        assert_eq!(stats.to_string(), "3 clusters, 10 packages, 42 modules");
    }

    #[test]
    fn test_convert_cache() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("spiderT.json"), DUMP).unwrap();
        let config = ModmapConfig {
            cache_dir: dir.path().to_path_buf(),
            cluster_config: None,
            log_level: "info".to_string(),
            log_json: false,
        };

        let stats = convert_cache(&config).unwrap();
        assert_eq!(stats.packages, 2);

        let (clusters, software) = read_modulemap(&dir.path().join("modulemap.json")).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(software["Bazel"].defaults["skitty"], "0.26.1");
    }

    #[test]
    fn test_convert_cache_missing_dump() {
        let dir = TempDir::new().unwrap();
        let config = ModmapConfig {
            cache_dir: dir.path().to_path_buf(),
            cluster_config: None,
            log_level: "info".to_string(),
            log_json: false,
        };
        assert!(matches!(
            convert_cache(&config),
            Err(ModmapError::Io { .. })
        ));
        assert!(!dir.path().join("modulemap.json").exists());
    }

    #[test]
    fn test_convert_cache_missing_cluster_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("spiderT.json"), DUMP).unwrap();
        let config = ModmapConfig {
            cache_dir: dir.path().to_path_buf(),
            cluster_config: Some(PathBuf::from("/nonexistent/clusters.yaml")),
            log_level: "info".to_string(),
            log_json: false,
        };
        assert!(matches!(
            convert_cache(&config),
            Err(ModmapError::Config(_))
        ));
    }
}
