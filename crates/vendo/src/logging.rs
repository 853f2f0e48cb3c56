use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    /// Show deliberately user-facing messages and errors.
    #[default]
    Default,
    /// Suppress all user-facing output.
    Quiet,
    /// Show all messages, including debug messages.
    Verbose,
}

/// Configure `tracing` based on the given [`Level`], taking into account
/// the `RUST_LOG` environment variable.
pub(crate) fn setup_logging(level: Level) {
    let filter = match level {
        Level::Default | Level::Quiet => {
            // Show nothing, but allow `RUST_LOG` to override.
            EnvFilter::builder()
                .with_default_directive(LevelFilter::OFF.into())
                .from_env_lossy()
        }
        Level::Verbose => {
            // Show `DEBUG` messages from this workspace, but allow
            // `RUST_LOG` to override.
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vendo=debug,vendo_extract=debug,vendo_installer=debug"))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(matches!(level, Level::Verbose))
                .with_writer(std::io::stderr),
        )
        .init();
}
