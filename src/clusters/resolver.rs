use crate::error::{ModmapError, Result};
use crate::lmod::ModulePathTable;
use std::collections::BTreeMap;
use tracing::debug;

/// Module names starting with this prefix mark a cluster
pub const CLUSTER_MODULE_PREFIX: &str = "cluster/";

/// Cluster identity (`name` or `name/partition`) -> cluster module name
pub type ClusterMap = BTreeMap<String, String>;

/// Module path -> sorted cluster identities served by it
pub type ModulePathClusterMap = BTreeMap<String, Vec<String>>;

/// A parsed `cluster/<name>[/<partition>]` module name
///
/// A leading `.` hides the cluster or partition from users; it is not part of
/// the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterModule {
    pub name: String,
    pub partition: Option<String>,
    pub hidden: bool,
}

impl ClusterModule {
    /// Parses a cluster module name; `None` if it is not a well-formed one
    pub fn parse(module: &str) -> Option<Self> {
        let rest = module.strip_prefix(CLUSTER_MODULE_PREFIX)?;
        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() > 2 {
            return None;
        }

        let hidden = segments.iter().any(|s| s.starts_with('.'));
        let mut names = segments.iter().map(|s| s.trim_start_matches('.'));
        let name = names.next().filter(|n| !n.is_empty())?;
        let partition = match names.next() {
            Some(p) if p.is_empty() => return None,
            Some(p) => Some(p.to_string()),
            None => None,
        };

        Some(Self {
            name: name.to_string(),
            partition,
            hidden,
        })
    }

    pub fn identity(&self) -> String {
        match &self.partition {
            Some(partition) => format!("{}/{}", self.name, partition),
            None => self.name.clone(),
        }
    }
}

/// Cluster identities and the module paths serving them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterIndex {
    pub clusters: ClusterMap,
    pub modulepaths: ModulePathClusterMap,
}

impl ClusterIndex {
    fn register(&mut self, modulepath: &str, module: &str, parsed: &ClusterModule) -> Result<()> {
        let cluster = parsed.identity();

        if parsed.partition.is_some() {
            if let Some(existing) = self.clusters.get(&parsed.name) {
                return Err(ModmapError::PartitionOfPlainCluster {
                    cluster: parsed.name.clone(),
                    existing: existing.clone(),
                    module: module.to_string(),
                });
            }
        } else {
            let prefix = format!("{}/", parsed.name);
            let partitions: Vec<String> = self
                .clusters
                .keys()
                .filter(|k| k.starts_with(&prefix))
                .cloned()
                .collect();
            if !partitions.is_empty() {
                return Err(ModmapError::PlainClusterWithPartitions {
                    cluster: parsed.name.clone(),
                    partitions,
                    module: module.to_string(),
                });
            }
        }

        let existing = self
            .clusters
            .entry(cluster.clone())
            .or_insert_with(|| module.to_string());
        if existing.as_str() != module {
            return Err(ModmapError::ConflictingClusterModule {
                cluster,
                existing: existing.clone(),
                module: module.to_string(),
            });
        }

        let members = self.modulepaths.entry(modulepath.to_string()).or_default();
        if !members.contains(&cluster) {
            members.push(cluster);
            members.sort();
        }
        Ok(())
    }
}

/// Builds the cluster map and the module path -> clusters map
pub fn resolve_clusters(table: &ModulePathTable) -> Result<ClusterIndex> {
    let mut index = ClusterIndex::default();

    for (modulepath, modules) in table {
        for module in modules.keys().filter(|m| m.starts_with(CLUSTER_MODULE_PREFIX)) {
            let parsed =
                ClusterModule::parse(module).ok_or_else(|| ModmapError::MalformedClusterModule {
                    module: module.clone(),
                    modulepath: modulepath.clone(),
                })?;
            index.register(modulepath, module, &parsed)?;
        }
    }

    debug!("Generated clustermap {:?}", index.clusters);
    debug!("Generated modulepathmap {:?}", index.modulepaths);
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lmod::LuaTable;
    use serde_json::Value;

    fn table(entries: Vec<(&str, Vec<&str>)>) -> ModulePathTable {
        entries
            .into_iter()
            .map(|(mpath, modules)| {
                let modules: LuaTable<Value> = modules
                    .into_iter()
                    .map(|m| (m, Value::String("/etc/modulefiles/vsc".to_string())))
                    .collect();
                (mpath, modules)
            })
            .collect()
    }

    #[test]
    fn test_parse_cluster_module() {
        assert_eq!(
            ClusterModule::parse("cluster/.joltik"),
            Some(ClusterModule {
                name: "joltik".to_string(),
                partition: None,
                hidden: true,
            })
        );
        let partitioned = ClusterModule::parse("cluster/cluster2/.part1").unwrap();
        assert_eq!(partitioned.identity(), "cluster2/part1");
        assert!(partitioned.hidden);
        assert!(!ClusterModule::parse("cluster/doduo").unwrap().hidden);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(ClusterModule::parse("GCC/8.2.0"), None);
        assert_eq!(ClusterModule::parse("cluster/"), None);
        assert_eq!(ClusterModule::parse("cluster/."), None);
        assert_eq!(ClusterModule::parse("cluster/a/"), None);
        assert_eq!(ClusterModule::parse("cluster/a/b/c"), None);
    }

    #[test]
    fn test_resolve_clusters() {
        let table = table(vec![
            (
                "/apps/mp1",
                vec![
                    "cluster/cluster1",
                    "cluster/cluster2/.part1",
                    "cluster/cluster2/part2",
                    "GCC/8.2.0",
                ],
            ),
            ("/apps/mp2", vec!["cluster/.cluster3"]),
        ]);

        let index = resolve_clusters(&table).unwrap();

        let expected: ClusterMap = [
            ("cluster1", "cluster/cluster1"),
            ("cluster2/part1", "cluster/cluster2/.part1"),
            ("cluster2/part2", "cluster/cluster2/part2"),
            ("cluster3", "cluster/.cluster3"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(index.clusters, expected);

        assert_eq!(
            index.modulepaths["/apps/mp1"],
            vec!["cluster1", "cluster2/part1", "cluster2/part2"]
        );
        assert_eq!(index.modulepaths["/apps/mp2"], vec!["cluster3"]);
    }

    #[test]
    fn test_same_cluster_on_several_modulepaths() {
        let table = table(vec![
            ("/apps/a", vec!["cluster/skitty", "cluster/doduo"]),
            ("/apps/b", vec!["cluster/skitty"]),
        ]);
        let index = resolve_clusters(&table).unwrap();
        assert_eq!(index.clusters.len(), 2);
        assert_eq!(index.modulepaths["/apps/a"], vec!["doduo", "skitty"]);
        assert_eq!(index.modulepaths["/apps/b"], vec!["skitty"]);
    }

    #[test]
    fn test_conflicting_cluster_modules() {
        let table = table(vec![
            ("/apps/a", vec!["cluster/skitty"]),
            ("/apps/b", vec!["cluster/.skitty"]),
        ]);
        match resolve_clusters(&table) {
            Err(ModmapError::ConflictingClusterModule {
                cluster,
                existing,
                module,
            }) => {
                assert_eq!(cluster, "skitty");
                assert_eq!(existing, "cluster/skitty");
                assert_eq!(module, "cluster/.skitty");
            }
            other => panic!("Expected ConflictingClusterModule, got {:?}", other),
        }
    }

    #[test]
    fn test_partition_after_plain_cluster() {
        let table = table(vec![
            ("/apps/a", vec!["cluster/donphan"]),
            ("/apps/b", vec!["cluster/donphan/gpu"]),
        ]);
        assert!(matches!(
            resolve_clusters(&table),
            Err(ModmapError::PartitionOfPlainCluster { .. })
        ));
    }

    #[test]
    fn test_plain_cluster_after_partition() {
        let table = table(vec![
            ("/apps/a", vec!["cluster/donphan/gpu"]),
            ("/apps/b", vec!["cluster/donphan"]),
        ]);
        match resolve_clusters(&table) {
            Err(ModmapError::PlainClusterWithPartitions {
                cluster, partitions, ..
            }) => {
                assert_eq!(cluster, "donphan");
                assert_eq!(partitions, vec!["donphan/gpu"]);
            }
            other => panic!("Expected PlainClusterWithPartitions, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_cluster_module() {
        let table = table(vec![("/apps/a", vec!["cluster/a/b/c"])]);
        assert!(matches!(
            resolve_clusters(&table),
            Err(ModmapError::MalformedClusterModule { .. })
        ));
    }
}
