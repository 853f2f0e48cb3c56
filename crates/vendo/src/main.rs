use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::ExitStatus;
use crate::logging::Level;

mod commands;
mod logging;

#[derive(Parser)]
#[command(author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Do not print any output.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    quiet: bool,

    /// Use verbose output.
    #[arg(global = true, long, short, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit the fetch manifest for the given coordinate lists.
    Manifest(ManifestArgs),
    /// Verify pre-fetched archives and assemble the offline vendor tree.
    Vendor(VendorArgs),
}

#[derive(Args)]
struct ManifestArgs {
    /// Files containing whitespace-separated `name-version` tokens.
    #[arg(required = true)]
    coordinates: Vec<PathBuf>,

    /// Registry mirror template with `{name}` and `{version}` placeholders.
    #[arg(long)]
    template: Option<String>,

    /// JSON file mapping `name-version` to `algorithm:hex` digests.
    #[arg(long)]
    checksums: Option<PathBuf>,
}

#[derive(Args)]
struct VendorArgs {
    /// Files containing whitespace-separated `name-version` tokens.
    #[arg(required = true)]
    coordinates: Vec<PathBuf>,

    /// Directory holding the fetched archives, one per expected filename.
    #[arg(long)]
    archives: PathBuf,

    /// The vendor tree root to assemble into.
    #[arg(long)]
    root: PathBuf,

    /// Bound the unpack worker pool to this many threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Registry mirror template with `{name}` and `{version}` placeholders.
    #[arg(long)]
    template: Option<String>,

    /// JSON file mapping `name-version` to `algorithm:hex` digests.
    #[arg(long)]
    checksums: Option<PathBuf>,
}

fn inner() -> Result<ExitStatus> {
    let cli = Cli::parse();

    logging::setup_logging(if cli.verbose {
        Level::Verbose
    } else if cli.quiet {
        Level::Quiet
    } else {
        Level::Default
    });

    match cli.command {
        Commands::Manifest(args) => commands::manifest(
            &args.coordinates,
            args.template.as_deref(),
            args.checksums.as_deref(),
        ),
        Commands::Vendor(args) => commands::vendor(
            &args.coordinates,
            &args.archives,
            &args.root,
            args.threads,
            args.template.as_deref(),
            args.checksums.as_deref(),
            cli.quiet,
        ),
    }
}

fn main() -> ExitCode {
    match inner() {
        Ok(code) => code.into(),
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                let mut causes = err.chain();
                eprintln!("error: {}", causes.next().map(ToString::to_string).unwrap_or_default());
                for err in causes {
                    eprintln!("  Caused by: {err}");
                }
            }
            ExitStatus::Error.into()
        }
    }
}
