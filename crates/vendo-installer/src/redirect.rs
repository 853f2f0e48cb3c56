use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, VendorEntry};

/// The file name of the redirect config inside the vendor root.
pub const REDIRECT_FILE: &str = "config.toml";

/// The generated config that redirects the build tool's dependency
/// resolution to the vendor tree instead of the network.
///
/// Regenerated in full on every assembly, never patched, so it can't go
/// stale relative to the tree. The `[vendored]` table names every entry so
/// the config always references exactly the directories that were placed.
#[derive(Debug, Serialize)]
pub struct RedirectConfig {
    source: Sources,
    vendored: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Serialize)]
struct Sources {
    #[serde(rename = "crates-io")]
    crates_io: ReplacedSource,
    #[serde(rename = "vendored-sources")]
    vendored_sources: DirectorySource,
}

#[derive(Debug, Serialize)]
struct ReplacedSource {
    #[serde(rename = "replace-with")]
    replace_with: String,
}

#[derive(Debug, Serialize)]
struct DirectorySource {
    directory: PathBuf,
}

impl RedirectConfig {
    pub fn new(vendor_root: &Path, entries: &[VendorEntry]) -> Self {
        Self {
            source: Sources {
                crates_io: ReplacedSource {
                    replace_with: "vendored-sources".to_string(),
                },
                vendored_sources: DirectorySource {
                    directory: vendor_root.to_path_buf(),
                },
            },
            vendored: entries
                .iter()
                .map(|entry| (entry.dir_name(), entry.path.clone()))
                .collect(),
        }
    }

    /// Write the config atomically to its well-known path inside the
    /// vendor root, returning that path.
    pub fn write(&self, vendor_root: &Path) -> Result<PathBuf, Error> {
        let path = vendor_root.join(REDIRECT_FILE);
        let contents = toml::to_string_pretty(self)?;
        write_atomic_sync(&path, contents.as_bytes())?;
        Ok(path)
    }
}

/// Write `data` to `path` atomically using a temporary file and atomic
/// rename.
fn write_atomic_sync(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("Write path must have a parent"))?;
    let temp_file = tempfile::NamedTempFile::new_in(parent)?;
    fs_err::write(&temp_file, data)?;
    temp_file.persist(path).map_err(|err| {
        std::io::Error::other(format!(
            "Failed to persist temporary file to {}: {}",
            path.display(),
            err.error
        ))
    })?;
    Ok(())
}
