use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Hash mismatch for `{filename}`\n\nExpected:\n  {expected}\n\nComputed:\n  {computed}")]
    HashMismatch {
        filename: String,
        expected: String,
        computed: String,
    },
    #[error("The archive at `{0}` is truncated or not a gzip-compressed tarball")]
    TruncatedArchive(PathBuf),
    #[error("Unsupported archive type: {0}")]
    UnsupportedArchive(PathBuf),
    #[error(
        "The top-level of the archive must only contain a single directory, but it contains: {0:?}"
    )]
    NonSingularArchive(Vec<OsString>),
    #[error("The top-level of the archive must only contain a single directory, but it's empty")]
    EmptyArchive,
}
