use std::path::{Path, PathBuf};

pub use error::Error;
pub use integrity::{verify, VerifiedArchive};

mod error;
pub mod hash;
mod integrity;

/// Extract a `.crate` (or plain `.tar.gz`) archive into the target
/// directory.
pub fn extract_archive(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<(), Error> {
    let source = source.as_ref();

    // `.crate` archives are gzip-compressed tarballs under another name.
    let is_tarball = source
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("crate"))
        || (source
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
            && source.file_stem().is_some_and(|stem| {
                Path::new(stem)
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("tar"))
            }));
    if !is_tarball {
        return Err(Error::UnsupportedArchive(source.to_path_buf()));
    }

    let mut archive =
        tar::Archive::new(flate2::read::GzDecoder::new(fs_err::File::open(source)?));
    // https://github.com/alexcrichton/tar-rs/issues/349
    archive.set_preserve_mtime(false);
    archive.unpack(target)?;
    Ok(())
}

/// Extract a crate archive and return the path to its top-level directory.
///
/// A `.crate` archive contains a single top-level directory called
/// `{name}-{version}`, holding the source files of the crate. Anything
/// else is malformed.
pub fn extract_source(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
) -> Result<PathBuf, Error> {
    extract_archive(&source, &target)?;

    let top_level = fs_err::read_dir(target.as_ref())?
        .collect::<std::io::Result<Vec<fs_err::DirEntry>>>()?;
    match top_level.as_slice() {
        [] => Err(Error::EmptyArchive),
        [root] => {
            if root.file_type()?.is_dir() {
                Ok(root.path())
            } else {
                Err(Error::NonSingularArchive(vec![root.file_name()]))
            }
        }
        entries => Err(Error::NonSingularArchive(
            entries.iter().map(fs_err::DirEntry::file_name).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use super::{extract_archive, extract_source, Error};

    /// Build a `{name}-{version}.crate`-style archive containing the given
    /// top-level directories, each with a stub manifest inside.
    fn build_archive(dir: &Path, filename: &str, top_level: &[&str]) -> PathBuf {
        let path = dir.join(filename);
        let file = fs_err::File::create(&path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for root in top_level {
            let contents = b"[package]\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(
                    &mut header,
                    format!("{root}/Cargo.toml"),
                    contents.as_slice(),
                )
                .unwrap();
        }
        builder
            .into_inner()
            .unwrap()
            .finish()
            .unwrap()
            .flush()
            .unwrap();
        path
    }

    #[test]
    fn extract_single_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive = build_archive(dir.path(), "xattr-0.2.2.crate", &["xattr-0.2.2"]);
        let target = dir.path().join("out");
        fs_err::create_dir(&target).unwrap();

        let root = extract_source(&archive, &target).unwrap();
        assert_eq!(root, target.join("xattr-0.2.2"));
        assert!(root.join("Cargo.toml").is_file());
    }

    #[test]
    fn reject_multiple_roots() {
        let dir = tempfile::tempdir().unwrap();
        let archive = build_archive(dir.path(), "weird.crate", &["one-1.0.0", "two-2.0.0"]);
        let target = dir.path().join("out");
        fs_err::create_dir(&target).unwrap();

        assert!(matches!(
            extract_source(&archive, &target),
            Err(Error::NonSingularArchive(_))
        ));
    }

    #[test]
    fn reject_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        fs_err::write(&path, b"").unwrap();
        assert!(matches!(
            extract_archive(&path, dir.path()),
            Err(Error::UnsupportedArchive(_))
        ));
    }
}
