use crate::config::ConfigError;
use crate::version::VersionError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a conversion run
///
/// Every variant carries the package, module path, module name or file needed
/// to find the offending entry in the spider cache.
#[derive(Debug, Error)]
pub enum ModmapError {
    #[error("Version {version} != canonical {canonical} for modulepath {modulepath} name {name} fullname {fullname}")]
    CanonicalMismatch {
        modulepath: String,
        name: String,
        fullname: String,
        version: String,
        canonical: String,
    },

    #[error("Fullname {fullname} != {name}/{version} for modulepath {modulepath}")]
    FullnameMismatch {
        modulepath: String,
        name: String,
        fullname: String,
        version: String,
    },

    #[error("Default value {default} found for {name} modulepath {modulepath} but no matching version in [{}]", versions.join(", "))]
    UnknownDefault {
        name: String,
        modulepath: String,
        default: String,
        versions: Vec<String>,
    },

    #[error("Unable to remove default {default} from versions [{}] for {name} cluster {cluster}", versions.join(", "))]
    DefaultNotInVersions {
        name: String,
        cluster: String,
        default: String,
        versions: Vec<String>,
    },

    #[error("Found 2 different cluster modules {existing} and {module} for same cluster {cluster}")]
    ConflictingClusterModule {
        cluster: String,
        existing: String,
        module: String,
    },

    #[error("Found existing cluster module {existing} for cluster {cluster}, refusing partition module {module}")]
    PartitionOfPlainCluster {
        cluster: String,
        existing: String,
        module: String,
    },

    #[error("Found existing partitions [{}] for cluster {cluster}, refusing cluster module {module}", partitions.join(", "))]
    PlainClusterWithPartitions {
        cluster: String,
        partitions: Vec<String>,
        module: String,
    },

    #[error("Malformed cluster module {module} in modulepath {modulepath}")]
    MalformedClusterModule { module: String, modulepath: String },

    #[error("Malformed spider data for modulepath {modulepath}: {source}")]
    MalformedModulePath {
        modulepath: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Version ordering failed for {name} ({location}): {source}")]
    VersionOrder {
        name: String,
        location: String,
        #[source]
        source: VersionError,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode modulemap: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ModmapError>;
