//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

use themeroller::config::ConfigError;
use themeroller::service::ServiceError;
use themeroller::ValidationError;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("{failed} of {total} images failed to render")]
    Render { failed: usize, total: usize },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache statistics: {0}")]
    CacheStats(String),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),
}
