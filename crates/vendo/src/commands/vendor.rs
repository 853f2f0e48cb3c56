use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use vendo::Resolver;

use crate::commands::{load_checksums, parse_template, read_blocks, ExitStatus};

/// Verify the pre-fetched archives and assemble the vendor tree.
pub(crate) fn vendor(
    coordinates: &[PathBuf],
    archives: &Path,
    root: &Path,
    threads: Option<usize>,
    template: Option<&str>,
    checksums: Option<&Path>,
    quiet: bool,
) -> Result<ExitStatus> {
    let blocks = read_blocks(coordinates)?;
    let resolver =
        Resolver::new(parse_template(template)?).with_checksums(load_checksums(checksums)?);
    let manifest = resolver.build_manifest(blocks.iter().map(String::as_str))?;
    debug!("Resolved {} archive(s) to vendor", manifest.len());

    let tree = resolver.vendor(&manifest, archives, root, threads)?;

    if !quiet {
        #[allow(clippy::print_stderr)]
        {
            eprintln!(
                "Vendored {} crate(s) into `{}`",
                tree.entries.len(),
                tree.root.display()
            );
        }
    }

    Ok(ExitStatus::Success)
}
