use crate::clusters::{ClusterConfig, ModulePathClusterMap};
use tracing::debug;

/// Orders the module paths to walk when building the software map
///
/// Only absolute module paths that serve at least one cluster are kept, sorted
/// lexicographically. Then the extra module paths of every configured cluster
/// are moved to the end. They are listed in prepend order, so the last one is
/// the preferred one; walking each list backwards moves the first-declared
/// extra furthest back.
///
/// The result decides default-version precedence: the first module path that
/// sets a default for a cluster wins.
pub fn sequence_modulepaths<'a, I>(
    spider_paths: I,
    mpmap: &ModulePathClusterMap,
    config: &ClusterConfig,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut modulepaths = Vec::new();
    for mpath in spider_paths {
        if !mpath.starts_with('/') {
            debug!("Skipping spiderT key {}", mpath);
        } else if mpmap.contains_key(mpath) {
            modulepaths.push(mpath.clone());
        } else {
            debug!("Skipping modulepath {} not in modulepath map", mpath);
        }
    }

    modulepaths.sort();
    debug!("Found pre-sorted modulepaths {:?}", modulepaths);

    for extras in config.extra_modulepaths() {
        for extra in extras.iter().rev() {
            match modulepaths.iter().position(|m| m == extra) {
                Some(index) => {
                    debug!("Moving extra modulepath {} to the end", extra);
                    let moved = modulepaths.remove(index);
                    modulepaths.push(moved);
                }
                None => debug!("Extra modulepath {} not found, not moving it", extra),
            }
        }
    }

    debug!("Sorted modulepaths {:?}", modulepaths);
    modulepaths
}
