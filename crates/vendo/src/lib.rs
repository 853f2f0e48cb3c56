//! One-shot resolution of pinned crate lists into fetch manifests and
//! offline vendor trees.
//!
//! A resolution pass has two phases, bridged by an external download step:
//!
//! 1. [`Resolver::build_manifest`] turns one or more `name-version`
//!    coordinate blocks into a deterministic [`FetchManifest`] for the
//!    outer build system's fetch phase. Pure; fails fast before anything
//!    is downloaded.
//! 2. Once the archives are on disk, [`Resolver::vendor`] gates each one
//!    on its checksum and assembles the vendor tree plus the redirect
//!    config the inner build tool needs to run offline.
//!
//! There is no ambient configuration: the registry template, checksums,
//! and vendor root are all explicit parameters.

use std::path::Path;

use rustc_hash::FxHashMap;

pub use vendo_coordinate::{parse_coordinate_block, Coordinate, CoordinateError, CrateName};
pub use vendo_extract::VerifiedArchive;
pub use vendo_installer::{Installer, RedirectConfig, VendorEntry, VendorTree};
pub use vendo_registry::{
    FetchDescriptor, FetchManifest, HashAlgorithm, HashDigest, RegistryError, RegistryTemplate,
};

/// Expected digests keyed by `name-version`.
pub type Checksums = FxHashMap<String, HashDigest>;

/// A single resolution pass over a package's pinned coordinates.
#[derive(Debug, Default)]
pub struct Resolver {
    template: RegistryTemplate,
    checksums: Checksums,
}

impl Resolver {
    pub fn new(template: RegistryTemplate) -> Self {
        Self {
            template,
            checksums: Checksums::default(),
        }
    }

    /// Attach expected digests, keyed by `name-version`.
    #[must_use]
    pub fn with_checksums(mut self, checksums: Checksums) -> Self {
        self.checksums = checksums;
        self
    }

    /// Build the merged fetch manifest for the given coordinate blocks.
    ///
    /// Deterministic: the same blocks and template always produce the
    /// same manifest, in declaration order.
    pub fn build_manifest<'a>(
        &self,
        blocks: impl IntoIterator<Item = &'a str>,
    ) -> Result<FetchManifest, Error> {
        let mut manifest = FetchManifest::new();
        for block in blocks {
            for coordinate in parse_coordinate_block(block)? {
                let mut descriptor = self.template.descriptor_for(&coordinate)?;
                if let Some(checksum) = self.checksums.get(&coordinate.dir_name()) {
                    descriptor = descriptor.with_checksum(checksum.clone());
                }
                manifest.add(descriptor)?;
            }
        }
        Ok(manifest)
    }

    /// Verify the externally fetched archives and assemble the vendor
    /// tree.
    ///
    /// `archive_dir` must contain one file per manifest descriptor, named
    /// by its expected filename. Any integrity or unpack failure fails the
    /// pass as a whole; the previous pass's redirect config (if any) is
    /// left untouched in that case.
    pub fn vendor(
        &self,
        manifest: &FetchManifest,
        archive_dir: &Path,
        vendor_root: &Path,
        threads: Option<usize>,
    ) -> Result<VendorTree, Error> {
        let mut archives = Vec::with_capacity(manifest.len());
        for descriptor in manifest.descriptors() {
            let path = archive_dir.join(&descriptor.filename);
            archives.push(vendo_extract::verify(descriptor, &path)?);
        }

        let mut installer = Installer::new(vendor_root);
        if let Some(threads) = threads {
            installer = installer.with_threads(threads);
        }
        Ok(installer.install(&archives)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Integrity(#[from] vendo_extract::Error),
    #[error(transparent)]
    Install(#[from] vendo_installer::Error),
}
