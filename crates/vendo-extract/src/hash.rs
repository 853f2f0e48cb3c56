use sha2::Digest;

use vendo_registry::{HashAlgorithm, HashDigest};

/// A streaming hasher for one of the supported algorithms.
#[derive(Debug)]
pub enum Hasher {
    Md5(md5::Md5),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md5(hasher) => hasher.update(data),
            Hasher::Sha256(hasher) => hasher.update(data),
            Hasher::Sha384(hasher) => hasher.update(data),
            Hasher::Sha512(hasher) => hasher.update(data),
        }
    }
}

impl From<HashAlgorithm> for Hasher {
    fn from(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Hasher::Md5(md5::Md5::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha384 => Hasher::Sha384(sha2::Sha384::new()),
            HashAlgorithm::Sha512 => Hasher::Sha512(sha2::Sha512::new()),
        }
    }
}

impl From<Hasher> for HashDigest {
    fn from(hasher: Hasher) -> Self {
        match hasher {
            Hasher::Md5(hasher) => HashDigest::new(
                HashAlgorithm::Md5,
                hex::encode(hasher.finalize()),
            ),
            Hasher::Sha256(hasher) => HashDigest::new(
                HashAlgorithm::Sha256,
                hex::encode(hasher.finalize()),
            ),
            Hasher::Sha384(hasher) => HashDigest::new(
                HashAlgorithm::Sha384,
                hex::encode(hasher.finalize()),
            ),
            Hasher::Sha512(hasher) => HashDigest::new(
                HashAlgorithm::Sha512,
                hex::encode(hasher.finalize()),
            ),
        }
    }
}
