//! Persisted modulemap JSON
//!
//! The document has two sections, `clusters` and `software`, and is always
//! replaced as a whole: it is written to a temporary file next to the target
//! and renamed over it.

use crate::clusters::ClusterMap;
use crate::error::{ModmapError, Result};
use crate::software::SoftwareMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// File name of the modulemap inside the cache directory
pub const JSON_MODULEMAP_FILENAME: &str = "modulemap.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleMapDocument {
    pub clusters: ClusterMap,
    pub software: SoftwareMap,
}

/// Atomically writes the modulemap, world readable
pub fn write_modulemap(path: &Path, clusters: &ClusterMap, software: &SoftwareMap) -> Result<()> {
    #[derive(Serialize)]
    struct DocumentRef<'a> {
        clusters: &'a ClusterMap,
        software: &'a SoftwareMap,
    }

    let io_err = |source| ModmapError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec(&DocumentRef { clusters, software }).map_err(ModmapError::Encode)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = world_readable_tempfile(dir).map_err(io_err)?;
    tmp.write_all(&json).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!("Wrote {}", path.display());
    Ok(())
}

/// Temporary file in `dir` that already has its final mode, so the rename
/// is the only change readers can observe
fn world_readable_tempfile(dir: &Path) -> std::io::Result<NamedTempFile> {
    let tmp = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    Ok(tmp)
}

/// Reads back a modulemap written by [`write_modulemap`]
pub fn read_modulemap(path: &Path) -> Result<(ClusterMap, SoftwareMap)> {
    let raw = fs::read_to_string(path).map_err(|source| ModmapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: ModuleMapDocument =
        serde_json::from_str(&raw).map_err(|source| ModmapError::Decode {
            what: path.display().to_string(),
            source,
        })?;
    debug!("Read {}", path.display());
    Ok((document.clusters, document.software))
}
