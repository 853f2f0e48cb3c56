use std::path::{Path, PathBuf};

use anyhow::Result;

use vendo::Resolver;

use crate::commands::{load_checksums, parse_template, read_blocks, ExitStatus};

/// Emit the merged fetch manifest for the outer build system's download
/// phase.
pub(crate) fn manifest(
    coordinates: &[PathBuf],
    template: Option<&str>,
    checksums: Option<&Path>,
) -> Result<ExitStatus> {
    let blocks = read_blocks(coordinates)?;
    let resolver =
        Resolver::new(parse_template(template)?).with_checksums(load_checksums(checksums)?);
    let manifest = resolver.build_manifest(blocks.iter().map(String::as_str))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", manifest.to_json()?);
    }

    Ok(ExitStatus::Success)
}
