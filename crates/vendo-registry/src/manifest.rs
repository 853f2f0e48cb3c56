use rustc_hash::{FxHashMap, FxHashSet};
use semver::Version;
use serde::Serialize;
use url::Url;

use vendo_coordinate::{CoordinateError, CrateName};

use crate::{FetchDescriptor, HashDigest, RegistryError};

/// The merged fetch manifest for one package build.
///
/// Descriptors may be aggregated across several coordinate blocks declared
/// by the same package; identical URLs collapse to the first occurrence and
/// first-seen order is preserved, so the manifest is deterministic for a
/// given declaration order.
#[derive(Debug, Default)]
pub struct FetchManifest {
    descriptors: Vec<FetchDescriptor>,
    seen: FxHashSet<Url>,
    pins: FxHashMap<CrateName, Version>,
}

impl FetchManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, collapsing exact URL duplicates.
    ///
    /// The same crate pinned at two different versions across blocks is a
    /// conflict, surfaced rather than silently resolved.
    pub fn add(&mut self, descriptor: FetchDescriptor) -> Result<(), RegistryError> {
        let name = &descriptor.coordinate.name;
        match self.pins.get(name) {
            Some(version) if *version != descriptor.coordinate.version => {
                return Err(RegistryError::Coordinate(
                    CoordinateError::DuplicateCoordinate {
                        name: name.clone(),
                        first: version.clone(),
                        second: descriptor.coordinate.version.clone(),
                    },
                ));
            }
            Some(_) => {}
            None => {
                self.pins
                    .insert(name.clone(), descriptor.coordinate.version.clone());
            }
        }
        if self.seen.insert(descriptor.url.clone()) {
            self.descriptors.push(descriptor);
        }
        Ok(())
    }

    /// The descriptors in first-seen order.
    pub fn descriptors(&self) -> &[FetchDescriptor] {
        &self.descriptors
    }

    /// Look up a descriptor by its expected filename.
    pub fn get(&self, filename: &str) -> Option<&FetchDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.filename == filename)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Serialize the `{url, filename, checksum?}` records consumed by the
    /// external download phase.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let records = self
            .descriptors
            .iter()
            .map(|descriptor| ManifestRecord {
                url: &descriptor.url,
                filename: &descriptor.filename,
                checksum: descriptor.checksum.as_ref(),
            })
            .collect::<Vec<_>>();
        serde_json::to_string_pretty(&records)
    }
}

impl IntoIterator for FetchManifest {
    type Item = FetchDescriptor;
    type IntoIter = std::vec::IntoIter<FetchDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

#[derive(Serialize)]
struct ManifestRecord<'a> {
    url: &'a Url,
    filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<&'a HashDigest>,
}
