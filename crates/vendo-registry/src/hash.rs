use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The content hash algorithms understood by the integrity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha256,
    Sha384,
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(HashParseError(format!(
                "Unsupported hash algorithm: `{s}` (expected one of `md5`, `sha256`, `sha384`, or `sha512`)"
            ))),
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Md5 => f.write_str("md5"),
            Self::Sha256 => f.write_str("sha256"),
            Self::Sha384 => f.write_str("sha384"),
            Self::Sha512 => f.write_str("sha512"),
        }
    }
}

/// An expected content digest, as `algorithm:hex` (e.g.
/// `sha256:2909cd29…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashDigest {
    pub algorithm: HashAlgorithm,
    pub digest: String,
}

impl HashDigest {
    pub fn new(algorithm: HashAlgorithm, digest: impl Into<String>) -> Self {
        Self {
            algorithm,
            digest: digest.into(),
        }
    }
}

impl FromStr for HashDigest {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((algorithm, digest)) = s.split_once(':') else {
            return Err(HashParseError(format!(
                "Unexpected hash (expected `<algorithm>:<hash>`): {s}"
            )));
        };
        let algorithm = HashAlgorithm::from_str(algorithm)?;
        if digest.is_empty() || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HashParseError(format!("Invalid hex digest: {digest}")));
        }
        Ok(Self {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        })
    }
}

impl Display for HashDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct HashParseError(String);
