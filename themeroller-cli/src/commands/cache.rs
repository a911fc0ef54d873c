//! Cache inspection CLI commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use themeroller::cache::disk_cache_stats;
use themeroller::config::format_size;

use super::common::load_config;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show disk cache statistics
    Stats {
        /// Cache directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,
    },
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, config_path: Option<&Path>) -> Result<(), CliError> {
    match action {
        CacheAction::Stats { cache_dir } => {
            let cache_dir = match cache_dir {
                Some(dir) => dir,
                None => load_config(config_path)?.cache.directory,
            };

            println!("Disk cache: {}", cache_dir.display());

            match disk_cache_stats(&cache_dir) {
                Ok(stats) => {
                    println!("  Images: {}", stats.files);
                    println!("  Size:   {}", format_size(stats.bytes));
                    Ok(())
                }
                Err(e) => Err(CliError::CacheStats(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_on_existing_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("ui-icons_ffffff_256x240.png"), b"png").unwrap();

        let action = CacheAction::Stats {
            cache_dir: Some(temp.path().to_path_buf()),
        };
        assert!(run(action, None).is_ok());
    }

    #[test]
    fn test_stats_on_missing_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let action = CacheAction::Stats {
            cache_dir: Some(temp.path().join("missing")),
        };
        assert!(matches!(run(action, None), Err(CliError::CacheStats(_))));
    }
}
