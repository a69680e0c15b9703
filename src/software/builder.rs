use crate::clusters::ModulePathClusterMap;
use crate::error::{ModmapError, Result};
use crate::lmod::{DefaultDeclaration, PackageRecord, SpiderTable};
use crate::software::SoftwareMap;
use crate::version::sort_recent_versions;
use tracing::debug;

/// Builds the software map by walking `modulepaths` in order
///
/// `modulepaths` is the output of
/// [`sequence_modulepaths`](crate::clusters::sequence_modulepaths); the first
/// module path to set a default for a (package, cluster) pair wins.
pub fn build_software_map(
    spider: &SpiderTable,
    mpmap: &ModulePathClusterMap,
    modulepaths: &[String],
) -> Result<SoftwareMap> {
    let mut softmap = SoftwareMap::new();

    for mpath in modulepaths {
        let (Some(clusters), Some(software)) = (mpmap.get(mpath), spider.get(mpath)) else {
            debug!("No clusters or software for modulepath {}", mpath);
            continue;
        };
        debug!("Processing modulepath {}", mpath);

        for (name, record) in software {
            let versions = checked_versions(mpath, name, record)?;
            let Some(default) = resolve_default(mpath, name, record.default.as_ref(), &versions)?
            else {
                debug!("No versions for {} in modulepath {}", name, mpath);
                continue;
            };

            let package = softmap.entry(name.clone()).or_default();
            for version in &versions {
                package.add_clusters(version, clusters);
            }

            for cluster in clusters {
                if let Some(existing) = package.set_default_if_absent(cluster, &default) {
                    // several modulepaths serve the same cluster
                    debug!(
                        "Already found default for {} for cluster {}: found {}, new {}",
                        name, cluster, existing, default
                    );
                }
            }
        }
    }

    Ok(softmap)
}

/// Versions of one package in one module path, after the integrity checks
fn checked_versions(mpath: &str, name: &str, record: &PackageRecord) -> Result<Vec<String>> {
    let mut versions = Vec::with_capacity(record.files.len());
    for (fullname, file) in &record.files {
        if file.version != file.canonical {
            return Err(ModmapError::CanonicalMismatch {
                modulepath: mpath.to_string(),
                name: name.to_string(),
                fullname: fullname.clone(),
                version: file.version.clone(),
                canonical: file.canonical.clone(),
            });
        }
        if *fullname != format!("{}/{}", name, file.version) {
            return Err(ModmapError::FullnameMismatch {
                modulepath: mpath.to_string(),
                name: name.to_string(),
                fullname: fullname.clone(),
                version: file.version.clone(),
            });
        }
        versions.push(file.version.clone());
    }
    Ok(versions)
}

/// Default version of a package in one module path
///
/// An explicit default (`version` or `name/version`) must be one of
/// `versions`. Without one, or with an empty one, the most recent version is
/// the default. `None` when there are no versions at all.
fn resolve_default(
    mpath: &str,
    name: &str,
    declaration: Option<&DefaultDeclaration>,
    versions: &[String],
) -> Result<Option<String>> {
    if let Some(declaration) = declaration {
        if !declaration.value.is_empty() {
            let prefix = format!("{}/", name);
            let default = declaration
                .value
                .strip_prefix(prefix.as_str())
                .unwrap_or(&declaration.value);
            if !versions.iter().any(|v| v == default) {
                return Err(ModmapError::UnknownDefault {
                    name: name.to_string(),
                    modulepath: mpath.to_string(),
                    default: default.to_string(),
                    versions: versions.to_vec(),
                });
            }
            return Ok(Some(default.to_string()));
        }
        // e.g. wrapper modules: https://easybuild.readthedocs.io/en/latest/Wrapping_dependencies.html
        debug!(
            "Default without value found for {} modulepath {}: {:?}",
            name, mpath, declaration
        );
    }

    let recent = sort_recent_versions(versions).map_err(|source| ModmapError::VersionOrder {
        name: name.to_string(),
        location: format!("modulepath {}", mpath),
        source,
    })?;
    Ok(recent.into_iter().next())
}
