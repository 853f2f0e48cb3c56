use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};

use vendo::{Checksums, HashDigest, RegistryTemplate};

pub(crate) use manifest::manifest;
pub(crate) use vendor::vendor;

mod manifest;
mod vendor;

#[derive(Copy, Clone)]
pub(crate) enum ExitStatus {
    /// The command succeeded.
    Success,

    /// The command failed due to an error in the user input.
    #[allow(unused)]
    Failure,

    /// The command failed with an unexpected error.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

/// Read the coordinate blocks named on the command line.
pub(crate) fn read_blocks(paths: &[impl AsRef<Path>]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            fs_err::read_to_string(path.as_ref())
                .with_context(|| format!("Failed to read `{}`", path.as_ref().display()))
        })
        .collect()
}

/// Parse the registry template flag, defaulting to crates.io.
pub(crate) fn parse_template(template: Option<&str>) -> Result<RegistryTemplate> {
    match template {
        Some(template) => Ok(RegistryTemplate::new(template)?),
        None => Ok(RegistryTemplate::default()),
    }
}

/// Load a JSON checksum file mapping `name-version` to `algorithm:hex`.
pub(crate) fn load_checksums(path: Option<&Path>) -> Result<Checksums> {
    let Some(path) = path else {
        return Ok(Checksums::default());
    };
    let contents = fs_err::read_to_string(path)
        .with_context(|| format!("Failed to read `{}`", path.display()))?;
    let raw: BTreeMap<String, String> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse `{}`", path.display()))?;
    raw.into_iter()
        .map(|(coordinate, digest)| {
            let digest = HashDigest::from_str(&digest)
                .with_context(|| format!("Invalid digest for `{coordinate}`"))?;
            Ok((coordinate, digest))
        })
        .collect()
}
