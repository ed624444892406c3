pub mod config;
pub mod error;

pub use config::{Config, StorageConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, DatabaseError, RusqliteErrorExt};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Honors `RUST_LOG`, falling back to `info`, and writes to stderr. Safe to
/// call more than once; only the first call installs the subscriber.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Kneecast core initialized");
    }
    Ok(())
}
