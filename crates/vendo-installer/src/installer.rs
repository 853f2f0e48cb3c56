use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use semver::Version;
use tracing::debug;

use vendo_coordinate::CrateName;
use vendo_extract::VerifiedArchive;

use crate::{Error, RedirectConfig};

/// One directory inside the vendor tree.
///
/// Immutable after assembly: a fresh coordinate set triggers a fresh
/// assembly, never an in-place patch.
#[derive(Debug, Clone)]
pub struct VendorEntry {
    pub name: CrateName,
    pub version: Version,
    pub path: PathBuf,
}

impl VendorEntry {
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// A fully assembled vendor tree.
#[derive(Debug)]
pub struct VendorTree {
    pub root: PathBuf,
    pub entries: Vec<VendorEntry>,
    pub redirect: PathBuf,
}

/// Assembles verified archives into the on-disk vendor tree.
#[derive(Debug)]
pub struct Installer {
    vendor_root: PathBuf,
    threads: Option<usize>,
}

impl Installer {
    pub fn new(vendor_root: impl Into<PathBuf>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            threads: None,
        }
    }

    /// Bound the unpack worker pool to the given number of threads.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Unpack all archives into `<root>/<name>-<version>/` and regenerate
    /// the redirect config.
    ///
    /// Each entry is staged in a temporary sibling directory and renamed
    /// into place, so a crash mid-unpack never exposes a partial entry
    /// under its final name. Entries that fail do not roll back entries
    /// that already succeeded, but the redirect config is only written
    /// after every entry for the pass is in place.
    pub fn install(&self, archives: &[VerifiedArchive]) -> Result<VendorTree, Error> {
        fs_err::create_dir_all(&self.vendor_root)?;
        self.sweep_staging()?;

        // Distinct archives claiming the same target directory would race
        // the rename protocol. The coordinate set is already unique per
        // name, so this is an internal-consistency fault, not a user error.
        let mut targets: FxHashMap<String, String> = FxHashMap::default();
        for archive in archives {
            let dir_name = archive.descriptor.coordinate.dir_name();
            if let Some(first) = targets.insert(dir_name.clone(), archive.descriptor.filename.clone())
            {
                return Err(Error::Collision {
                    dir_name,
                    first,
                    second: archive.descriptor.filename.clone(),
                });
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.unwrap_or(0))
            .build()?;
        let entries = pool.install(|| {
            archives
                .par_iter()
                .map(|archive| self.place(archive))
                .collect::<Result<Vec<VendorEntry>, Error>>()
        })?;

        // All entries are in place; only now is the redirect regenerated.
        let redirect = RedirectConfig::new(&self.vendor_root, &entries).write(&self.vendor_root)?;

        Ok(VendorTree {
            root: self.vendor_root.clone(),
            entries,
            redirect,
        })
    }

    /// Unpack one archive into its final directory.
    fn place(&self, archive: &VerifiedArchive) -> Result<VendorEntry, Error> {
        let coordinate = &archive.descriptor.coordinate;
        let target = self.vendor_root.join(coordinate.dir_name());

        let staging = tempfile::tempdir_in(&self.vendor_root)?;
        let unpacked = vendo_extract::extract_source(&archive.path, staging.path())?;

        debug!("Placing vendor entry `{}`", coordinate.dir_name());
        replace_dir(&unpacked, &target)?;

        Ok(VendorEntry {
            name: coordinate.name.clone(),
            version: coordinate.version.clone(),
            path: target,
        })
    }

    /// Remove staging directories left behind by an interrupted pass.
    fn sweep_staging(&self) -> Result<(), Error> {
        for entry in fs_err::read_dir(&self.vendor_root)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(".tmp"))
            {
                debug!("Removing stale staging path `{}`", entry.path().display());
                if entry.file_type()?.is_dir() {
                    fs_err::remove_dir_all(entry.path())?;
                } else {
                    fs_err::remove_file(entry.path())?;
                }
            }
        }
        Ok(())
    }
}

/// Move `src` into place at `dst`, replacing any complete entry left by a
/// previous pass. The rename itself is atomic: a concurrent reader sees
/// either the old entry or the new one, never a mix.
fn replace_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
    match fs_err::remove_dir_all(dst) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs_err::rename(src, dst)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use vendo_coordinate::Coordinate;
    use vendo_extract::VerifiedArchive;
    use vendo_registry::RegistryTemplate;

    use super::Installer;
    use crate::Error;

    fn build_archive(dir: &Path, coordinate: &Coordinate) -> PathBuf {
        let path = dir.join(format!("{coordinate}.crate"));
        let file = fs_err::File::create(&path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let contents = format!("[package]\nname = \"{}\"\n", coordinate.name);
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("{coordinate}/Cargo.toml"),
                contents.as_bytes(),
            )
            .unwrap();
        builder
            .into_inner()
            .unwrap()
            .finish()
            .unwrap()
            .flush()
            .unwrap();
        path
    }

    fn archive_for(dir: &Path, token: &str) -> VerifiedArchive {
        let coordinate = Coordinate::parse(token).unwrap();
        let path = build_archive(dir, &coordinate);
        VerifiedArchive {
            descriptor: RegistryTemplate::default()
                .descriptor_for(&coordinate)
                .unwrap(),
            path,
            verified: false,
        }
    }

    #[test]
    fn assemble_and_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let archives = ["adler32-1.0.4", "arrayref-0.3.6", "xattr-0.2.2"]
            .map(|token| archive_for(dir.path(), token));

        let root = dir.path().join("vendor");
        let tree = Installer::new(&root).install(&archives).unwrap();

        assert_eq!(tree.entries.len(), 3);
        for name in ["adler32-1.0.4", "arrayref-0.3.6", "xattr-0.2.2"] {
            assert!(root.join(name).join("Cargo.toml").is_file());
        }

        let config = fs_err::read_to_string(&tree.redirect).unwrap();
        for entry in &tree.entries {
            assert!(
                config.contains(&entry.path.display().to_string()),
                "redirect config is missing `{}`",
                entry.dir_name()
            );
        }
    }

    #[test]
    fn reassembly_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let archives = [archive_for(dir.path(), "adler32-1.0.4")];
        let installer = Installer::new(dir.path().join("vendor"));

        let first = installer.install(&archives).unwrap();
        let first_config = fs_err::read(&first.redirect).unwrap();
        let second = installer.install(&archives).unwrap();
        let second_config = fs_err::read(&second.redirect).unwrap();

        assert_eq!(first_config, second_config);
    }

    #[test]
    fn stale_entries_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vendor");
        let stale = root.join("adler32-1.0.4");
        fs_err::create_dir_all(&stale).unwrap();
        fs_err::write(stale.join("leftover.rs"), b"").unwrap();

        let archives = [archive_for(dir.path(), "adler32-1.0.4")];
        Installer::new(&root).install(&archives).unwrap();

        assert!(stale.join("Cargo.toml").is_file());
        assert!(!stale.join("leftover.rs").exists());
    }

    #[test]
    fn interrupted_staging_is_swept() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vendor");
        // Simulate a crash between unpack and rename: a staging directory
        // with unpacked contents, never renamed into place.
        let staging = root.join(".tmpCrashed");
        fs_err::create_dir_all(staging.join("adler32-1.0.4")).unwrap();

        let archives = [archive_for(dir.path(), "adler32-1.0.4")];
        let tree = Installer::new(&root).install(&archives).unwrap();

        assert!(!staging.exists());
        assert_eq!(tree.entries.len(), 1);
        assert!(root.join("adler32-1.0.4").join("Cargo.toml").is_file());
    }

    #[test]
    fn colliding_targets_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let coordinate = Coordinate::parse("adler32-1.0.4").unwrap();
        let path = build_archive(dir.path(), &coordinate);

        let mirror = RegistryTemplate::new("https://mirror.example/{name}/{version}/download")
            .unwrap();
        let archives = [
            VerifiedArchive {
                descriptor: RegistryTemplate::default()
                    .descriptor_for(&coordinate)
                    .unwrap(),
                path: path.clone(),
                verified: false,
            },
            VerifiedArchive {
                descriptor: mirror.descriptor_for(&coordinate).unwrap(),
                path,
                verified: false,
            },
        ];

        assert!(matches!(
            Installer::new(dir.path().join("vendor")).install(&archives),
            Err(Error::Collision { .. })
        ));
    }
}
