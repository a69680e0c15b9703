//! modmap - cluster and software maps derived from the Lmod spider cache
//!
//! The Lmod spider cache knows every module under every module path, but not
//! which HPC cluster a module path belongs to. Sites mark that with a
//! `cluster/<name>[/<partition>]` module in the module path. This library
//! reads a JSON dump of the cache and derives:
//!
//! - the **cluster map**: cluster identity -> cluster module
//! - the **software map**: package -> version -> clusters, plus the default
//!   version of every package on every cluster
//! - the **cluster view**: cluster -> package -> versions, default first
//!
//! # Example Usage
//!
//! ```no_run
//! use modmap::{convert_tables, software_cluster_view, ClusterConfig, LmodTables};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tables = LmodTables::load(Path::new("/var/cache/lmod/spiderT.json"))?;
//! let conversion = convert_tables(&tables, &ClusterConfig::default())?;
//! println!("{}", conversion.stats);
//!
//! let clview = software_cluster_view(conversion.software)?;
//! for (cluster, packages) in &clview {
//!     println!("{}: {} packages", cluster, packages.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`version`]: ordering of Lmod version strings
//! - [`lmod`]: decoding of the spider cache dump
//! - [`clusters`]: cluster resolution and module path ordering
//! - [`software`]: software map and per-cluster view
//! - [`store`]: the persisted modulemap
//! - [`convert`]: a full conversion run

pub mod cli;
pub mod clusters;
pub mod config;
pub mod convert;
pub mod error;
pub mod lmod;
pub mod software;
pub mod store;
pub mod util;
pub mod version;

pub use clusters::{
    resolve_clusters, sequence_modulepaths, ClusterConfig, ClusterIndex, ClusterMap,
    ClusterModule, ModulePathClusterMap,
};
pub use config::{ConfigError, ModmapConfig};
pub use convert::{convert_cache, convert_file, convert_tables, Conversion, ConversionStats};
pub use error::{ModmapError, Result};
pub use lmod::LmodTables;
pub use software::{
    build_software_map, software_cluster_view, ClusterView, PackageVersions, SoftwareMap,
};
pub use store::{read_modulemap, write_modulemap};
pub use util::{init_logging, LoggingConfig};
pub use version::{compare_versions, sort_recent_versions, SoftwareVersion, VersionError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
