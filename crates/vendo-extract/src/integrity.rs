use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::warn;

use vendo_registry::{FetchDescriptor, HashDigest};

use crate::hash::Hasher;
use crate::Error;

/// Magic bytes at the start of every gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The smallest possible gzip stream: a 10-byte header and an 8-byte
/// trailer around an empty deflate block.
const GZIP_MIN_LEN: u64 = 20;

/// An archive that has passed the integrity gate.
///
/// `verified` is `false` when the descriptor carried no checksum and the
/// archive was only sanity-checked, never when a checksum comparison
/// failed: a mismatch rejects the archive outright.
#[derive(Debug)]
pub struct VerifiedArchive {
    pub descriptor: FetchDescriptor,
    pub path: PathBuf,
    pub verified: bool,
}

/// Gate an externally fetched archive on its expected checksum.
///
/// Performs no network I/O: the bytes must already be on disk at `path`.
/// With a checksum on the descriptor, the content hash must match exactly.
/// Without one, the archive is accepted on a size and gzip-format sanity
/// check alone and flagged as unverified.
pub fn verify(descriptor: &FetchDescriptor, path: &Path) -> Result<VerifiedArchive, Error> {
    let file = fs_err::File::open(path)?;
    if file.metadata()?.len() < GZIP_MIN_LEN {
        return Err(Error::TruncatedArchive(path.to_path_buf()));
    }

    let mut reader = std::io::BufReader::new(file);
    let mut magic = [0u8; 2];
    reader.read_exact(&mut magic)?;
    if magic != GZIP_MAGIC {
        return Err(Error::TruncatedArchive(path.to_path_buf()));
    }

    let Some(expected) = descriptor.checksum.as_ref() else {
        warn!(
            "No checksum for `{}`; accepting the archive unverified",
            descriptor.filename
        );
        return Ok(VerifiedArchive {
            descriptor: descriptor.clone(),
            path: path.to_path_buf(),
            verified: false,
        });
    };

    let mut hasher = Hasher::from(expected.algorithm);
    hasher.update(&magic);
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    let computed = HashDigest::from(hasher);
    if computed != *expected {
        return Err(Error::HashMismatch {
            filename: descriptor.filename.clone(),
            expected: expected.to_string(),
            computed: computed.to_string(),
        });
    }

    Ok(VerifiedArchive {
        descriptor: descriptor.clone(),
        path: path.to_path_buf(),
        verified: true,
    })
}
