use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Key holding the per-cluster defaults in the serialized package map
pub const DEFAULT_KEY: &str = ".default";

/// Package name -> versions and defaults
pub type SoftwareMap = BTreeMap<String, PackageVersions>;

/// All versions of one package and the default version per cluster
///
/// Serialized as a single JSON object: every version maps to its sorted
/// cluster list and the reserved [`DEFAULT_KEY`] maps cluster -> default.
///
/// ```json
/// {".default": {"joltik": "2.69-GCCcore-8.3.0"},
///  "2.69-GCCcore-8.2.0": ["joltik"],
///  "2.69-GCCcore-8.3.0": ["joltik"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageVersions {
    /// Version -> sorted clusters offering it
    pub versions: BTreeMap<String, Vec<String>>,
    /// Cluster -> default version; the keys are all clusters with this package
    pub defaults: BTreeMap<String, String>,
}

impl PackageVersions {
    /// Adds clusters to a version, keeping the list sorted and unique
    pub fn add_clusters(&mut self, version: &str, clusters: &[String]) {
        let offered = self.versions.entry(version.to_string()).or_default();
        for cluster in clusters {
            if !offered.contains(cluster) {
                offered.push(cluster.clone());
            }
        }
        offered.sort();
    }

    /// Records a default unless the cluster already has one
    ///
    /// Returns the default that was already there when it differs.
    pub fn set_default_if_absent(&mut self, cluster: &str, version: &str) -> Option<&str> {
        let current = self
            .defaults
            .entry(cluster.to_string())
            .or_insert_with(|| version.to_string());
        if current.as_str() == version {
            None
        } else {
            Some(current.as_str())
        }
    }
}

impl Serialize for PackageVersions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.versions.len() + 1))?;
        map.serialize_entry(DEFAULT_KEY, &self.defaults)?;
        for (version, clusters) in &self.versions {
            map.serialize_entry(version, clusters)?;
        }
        map.end()
    }
}

struct PackageVersionsVisitor;

impl<'de> Visitor<'de> for PackageVersionsVisitor {
    type Value = PackageVersions;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map of versions to clusters with a '{}' entry", DEFAULT_KEY)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut package = PackageVersions::default();
        while let Some(key) = map.next_key::<String>()? {
            if key == DEFAULT_KEY {
                package.defaults = map.next_value()?;
            } else {
                let clusters: Vec<String> = map.next_value()?;
                package.versions.insert(key, clusters);
            }
        }
        Ok(package)
    }
}

impl<'de> Deserialize<'de> for PackageVersions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PackageVersionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clusters(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_add_clusters_union() {
        let mut package = PackageVersions::default();
        package.add_clusters("1.0", &clusters(&["victini", "skitty"]));
        package.add_clusters("1.0", &clusters(&["skitty", "doduo"]));
        assert_eq!(package.versions["1.0"], vec!["doduo", "skitty", "victini"]);
    }

    #[test]
    fn test_first_default_wins() {
        let mut package = PackageVersions::default();
        assert_eq!(package.set_default_if_absent("doduo", "2.0"), None);
        assert_eq!(package.set_default_if_absent("doduo", "2.0"), None);
        assert_eq!(package.set_default_if_absent("doduo", "1.0"), Some("2.0"));
        assert_eq!(package.defaults["doduo"], "2.0");
    }

    #[test]
    fn test_serialized_layout() {
        let mut package = PackageVersions::default();
        package.add_clusters("20180311-GCCcore-8.2.0", &clusters(&["joltik"]));
        package.add_clusters("20180311-GCCcore-8.3.0", &clusters(&["joltik"]));
        package.set_default_if_absent("joltik", "20180311-GCCcore-8.3.0");

        assert_eq!(
            serde_json::to_value(&package).unwrap(),
            json!({
                ".default": {"joltik": "20180311-GCCcore-8.3.0"},
                "20180311-GCCcore-8.2.0": ["joltik"],
                "20180311-GCCcore-8.3.0": ["joltik"]
            })
        );
    }

    #[test]
    fn test_deserialize() {
        let package: PackageVersions = serde_json::from_value(json!({
            "0.20.0-GCCcore-8.2.0": ["skitty", "victini"],
            ".default": {"skitty": "0.20.0-GCCcore-8.2.0"}
        }))
        .unwrap();
        assert_eq!(package.defaults["skitty"], "0.20.0-GCCcore-8.2.0");
        assert_eq!(
            package.versions["0.20.0-GCCcore-8.2.0"],
            vec!["skitty", "victini"]
        );
    }

    #[test]
    fn test_deserialize_rejects_non_list_versions() {
        let result: Result<PackageVersions, _> =
            serde_json::from_value(json!({"1.0": "skitty"}));
        assert!(result.is_err());
    }
}
