use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rustc_hash::FxHashMap;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{CrateName, InvalidNameError};

/// A pinned `(name, version)` pair identifying one sub-dependency.
///
/// Immutable once parsed; the version is an exact semver pin, never a
/// requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub name: CrateName,
    pub version: Version,
}

impl Coordinate {
    /// Parse a single `name-version` token.
    ///
    /// The dash is used both as the name-version separator and inside crate
    /// names, so the token grammar is ambiguous (`some-lib-2-1.0.0` could
    /// split three ways). The tie-break is that the longest trailing suffix
    /// that parses as a semver version wins: dashes are scanned left to
    /// right and the first suffix the version grammar accepts is taken.
    /// This also handles pre-release pins like `clap-3.0.0-beta.2`, where
    /// the version itself contains a dash.
    pub fn parse(token: &str) -> Result<Self, CoordinateError> {
        let mut search = 0;
        while let Some(index) = token[search..].find('-').map(|offset| search + offset) {
            let (name, version) = (&token[..index], &token[index + 1..]);
            if !name.is_empty() {
                if let Ok(version) = Version::parse(version) {
                    let name = CrateName::from_str(name)?;
                    return Ok(Self { name, version });
                }
            }
            search = index + 1;
        }
        Err(CoordinateError::MalformedCoordinate(token.to_string()))
    }

    /// The canonical `name-version` directory name for this coordinate in
    /// the vendor tree.
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Parse a whitespace-separated block of `name-version` tokens, as declared
/// in a build recipe.
///
/// Order is preserved for deterministic downstream manifests. Tokens that
/// repeat an identical pin are collapsed to the first occurrence; the same
/// name pinned at two different versions is an error, never silently
/// resolved.
pub fn parse_coordinate_block(text: &str) -> Result<Vec<Coordinate>, CoordinateError> {
    let mut seen: FxHashMap<CrateName, Version> = FxHashMap::default();
    let mut coordinates = Vec::new();

    for token in text.split_whitespace() {
        let coordinate = Coordinate::parse(token)?;
        match seen.get(&coordinate.name) {
            Some(version) if *version == coordinate.version => {}
            Some(version) => {
                return Err(CoordinateError::DuplicateCoordinate {
                    name: coordinate.name,
                    first: version.clone(),
                    second: coordinate.version,
                });
            }
            None => {
                seen.insert(coordinate.name.clone(), coordinate.version.clone());
                coordinates.push(coordinate);
            }
        }
    }

    Ok(coordinates)
}

#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    #[error("Unable to identify a version suffix in `{0}`")]
    MalformedCoordinate(String),
    #[error("`{name}` is pinned at both {first} and {second}")]
    DuplicateCoordinate {
        name: CrateName,
        first: Version,
        second: Version,
    },
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
}
