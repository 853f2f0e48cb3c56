use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::validate_name;

/// The validated name of a crate.
///
/// Preserved verbatim; see [`crate::validate_name`] for the accepted grammar.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CrateName(String);

impl CrateName {
    /// Create a validated crate name from an owned string.
    #[allow(clippy::needless_pass_by_value)]
    pub fn from_owned(name: String) -> Result<Self, InvalidNameError> {
        validate_name(&name).map(Self)
    }

    /// Returns the underlying crate name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CrateName {
    type Err = InvalidNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        validate_name(name).map(Self)
    }
}

impl<'de> Deserialize<'de> for CrateName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::from_owned(name).map_err(serde::de::Error::custom)
    }
}

impl Display for CrateName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for CrateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Invalid [`CrateName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not a valid crate name: `{0}`")]
pub struct InvalidNameError(pub(crate) String);

impl InvalidNameError {
    /// Returns the invalid name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::CrateName;

    #[test]
    fn valid_names() {
        for name in ["adler32", "arrayref", "xattr", "serde_json", "tokio-util", "md-5"] {
            assert_eq!(CrateName::from_str(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn invalid_names() {
        for name in ["", "-leading", "_leading", "has space", "has/slash", "café"] {
            assert!(CrateName::from_str(name).is_err(), "accepted: {name}");
        }
    }

    #[test]
    fn names_are_not_normalized() {
        // `foo-bar` and `foo_bar` are distinct crates on the registry.
        assert_ne!(
            CrateName::from_str("foo-bar").unwrap(),
            CrateName::from_str("foo_bar").unwrap()
        );
    }
}
