use crate::error::{ModmapError, Result};
use crate::software::SoftwareMap;
use crate::version::sort_recent_versions;
use std::collections::{BTreeMap, BTreeSet};

/// Cluster -> package name -> versions, default first, rest most recent first
pub type ClusterView = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Inverts a software map into a per-cluster listing
///
/// Takes the map by value; clone it first if it is still needed.
pub fn software_cluster_view(softmap: SoftwareMap) -> Result<ClusterView> {
    let mut clview = ClusterView::new();

    for (name, package) in softmap {
        let mut clusters: BTreeSet<String> = package.defaults.keys().cloned().collect();
        for cluster in package.defaults.keys() {
            clview
                .entry(cluster.clone())
                .or_default()
                .entry(name.clone())
                .or_default();
        }

        for (version, offered) in package.versions {
            for cluster in offered {
                clview
                    .entry(cluster.clone())
                    .or_default()
                    .entry(name.clone())
                    .or_default()
                    .push(version.clone());
                clusters.insert(cluster);
            }
        }

        for cluster in clusters {
            let Some(versions) = clview.get_mut(&cluster).and_then(|s| s.get_mut(&name)) else {
                continue;
            };
            let mut sorted =
                sort_recent_versions(versions.as_slice()).map_err(|source| ModmapError::VersionOrder {
                    name: name.clone(),
                    location: format!("cluster {}", cluster),
                    source,
                })?;

            if let Some(default) = package.defaults.get(&cluster) {
                let Some(index) = sorted.iter().position(|v| v == default) else {
                    return Err(ModmapError::DefaultNotInVersions {
                        name,
                        cluster,
                        default: default.clone(),
                        versions: sorted,
                    });
                };
                let default = sorted.remove(index);
                sorted.insert(0, default);
            }
            *versions = sorted;
        }
    }

    Ok(clview)
}
