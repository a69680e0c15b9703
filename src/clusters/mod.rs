//! Cluster identities and module path ordering
//!
//! - [`resolver`]: which cluster module names exist and which module paths
//!   serve which clusters
//! - [`config`]: the site cluster configuration (extra module paths)
//! - [`sequencer`]: the order in which module paths are walked

pub mod config;
pub mod resolver;
pub mod sequencer;

pub use config::{ClusterConfig, ClusterEntry};
pub use resolver::{
    resolve_clusters, ClusterIndex, ClusterMap, ClusterModule, ModulePathClusterMap,
    CLUSTER_MODULE_PREFIX,
};
pub use sequencer::sequence_modulepaths;
