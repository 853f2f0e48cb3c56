use std::fmt::{Display, Formatter};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use url::Url;

use vendo_coordinate::Coordinate;

use crate::HashDigest;

/// Characters that must be percent-encoded inside a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'+');

/// A registry mirror URL template with `{name}` and `{version}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTemplate(String);

impl RegistryTemplate {
    /// The canonical upstream download endpoint.
    pub const CRATES_IO: &'static str =
        "https://crates.io/api/v1/crates/{name}/{version}/download";

    /// Create a template, rejecting one that lacks either placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self, RegistryError> {
        let template = template.into();
        if !template.contains("{name}") || !template.contains("{version}") {
            return Err(RegistryError::InvalidTemplate(template));
        }
        Ok(Self(template))
    }

    /// Synthesize the fetch descriptor for a coordinate.
    ///
    /// Pure: the same coordinate and template always yield a byte-identical
    /// descriptor. Name and version are percent-encoded before
    /// substitution; a coordinate whose substituted form still isn't a
    /// valid URL cannot be addressed by this registry.
    pub fn descriptor_for(&self, coordinate: &Coordinate) -> Result<FetchDescriptor, RegistryError> {
        let name = utf8_percent_encode(coordinate.name.as_str(), SEGMENT).to_string();
        let version = utf8_percent_encode(&coordinate.version.to_string(), SEGMENT).to_string();
        let rendered = self
            .0
            .replace("{name}", &name)
            .replace("{version}", &version);
        let url = Url::parse(&rendered).map_err(|err| RegistryError::UnsupportedCoordinate {
            coordinate: coordinate.clone(),
            err,
        })?;
        Ok(FetchDescriptor {
            coordinate: coordinate.clone(),
            filename: format!("{}.crate", coordinate.dir_name()),
            url,
            checksum: None,
        })
    }
}

impl Default for RegistryTemplate {
    fn default() -> Self {
        Self(Self::CRATES_IO.to_string())
    }
}

impl Display for RegistryTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One downloadable archive location, derived deterministically from a
/// coordinate and a registry template.
///
/// Owned by the fetch manifest until the external download phase consumes
/// it; the resolver itself never fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchDescriptor {
    pub coordinate: Coordinate,
    pub url: Url,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<HashDigest>,
}

impl FetchDescriptor {
    /// Attach an expected content digest.
    #[must_use]
    pub fn with_checksum(mut self, checksum: HashDigest) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

impl Display for FetchDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.url, self.filename)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry template must contain `{{name}}` and `{{version}}` placeholders: `{0}`")]
    InvalidTemplate(String),
    #[error("`{coordinate}` cannot be addressed by the registry")]
    UnsupportedCoordinate {
        coordinate: Coordinate,
        #[source]
        err: url::ParseError,
    },
    #[error(transparent)]
    Coordinate(#[from] vendo_coordinate::CoordinateError),
}

#[cfg(test)]
mod tests {
    use vendo_coordinate::Coordinate;

    use super::{RegistryError, RegistryTemplate};

    #[test]
    fn default_template() {
        let template = RegistryTemplate::default();
        let coordinate = Coordinate::parse("xattr-0.2.2").unwrap();
        let descriptor = template.descriptor_for(&coordinate).unwrap();
        assert_eq!(
            descriptor.url.as_str(),
            "https://crates.io/api/v1/crates/xattr/0.2.2/download"
        );
        assert_eq!(descriptor.filename, "xattr-0.2.2.crate");
        assert!(descriptor.checksum.is_none());
    }

    #[test]
    fn synthesis_is_deterministic() {
        let template = RegistryTemplate::new("https://mirror.example/{name}/{version}.crate").unwrap();
        let coordinate = Coordinate::parse("adler32-1.0.4").unwrap();
        let first = template.descriptor_for(&coordinate).unwrap();
        let second = template.descriptor_for(&coordinate).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn build_metadata_is_encoded() {
        let template = RegistryTemplate::default();
        let coordinate = Coordinate::parse("demo-1.0.0+build.5").unwrap();
        let descriptor = template.descriptor_for(&coordinate).unwrap();
        assert_eq!(
            descriptor.url.as_str(),
            "https://crates.io/api/v1/crates/demo/1.0.0%2Bbuild.5/download"
        );
    }

    #[test]
    fn missing_placeholder_rejected() {
        assert!(matches!(
            RegistryTemplate::new("https://mirror.example/{name}.crate"),
            Err(RegistryError::InvalidTemplate(_))
        ));
    }
}
