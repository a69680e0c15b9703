//! Software availability per cluster
//!
//! [`build_software_map`] turns the spider table into package -> version ->
//! clusters plus a default version per cluster. [`software_cluster_view`]
//! turns that around into cluster -> package -> versions.

pub mod builder;
pub mod map;
pub mod view;

pub use builder::build_software_map;
pub use map::{PackageVersions, SoftwareMap, DEFAULT_KEY};
pub use view::{software_cluster_view, ClusterView};
