//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use themeroller::config::ConfigFile;
use themeroller::render::DEFAULT_CONVERT_PROGRAM;
use themeroller::service::{BackendConfig, PersistPolicy, ServiceConfig};

use crate::error::CliError;

/// Rendering backend selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BackendType {
    /// ImageMagick `convert` (matches the hosted ThemeRoller output)
    Magick,
    /// Built-in renderer, no external tools required
    Raster,
}

/// Loads the configuration file given with `--config`, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

/// Settings that can override the configuration file.
#[derive(Debug, Default, Args)]
pub struct ServiceArgs {
    /// Cache directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding icon/mask.png and texture/*.png
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Rendering backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendType>,

    /// ImageMagick binary (magick backend only)
    #[arg(long, value_name = "PATH")]
    pub convert: Option<PathBuf>,

    /// Maximum concurrent renders
    #[arg(long, short = 'j')]
    pub concurrency: Option<usize>,
}

impl ServiceArgs {
    /// Resolves the service configuration: CLI takes precedence, then config.
    pub fn resolve(&self, config: &ConfigFile) -> Result<ServiceConfig, CliError> {
        let mut service = config.to_service_config();

        if let Some(dir) = &self.cache_dir {
            service.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.assets {
            service.asset_dir = dir.clone();
        }

        let configured_program = match &config.render.backend {
            BackendConfig::Magick { program } => Some(program.clone()),
            BackendConfig::Raster => None,
        };
        let backend = match (self.backend, &self.convert) {
            (Some(BackendType::Raster), _) => Some(BackendConfig::Raster),
            (Some(BackendType::Magick), program) | (None, program @ Some(_)) => {
                Some(BackendConfig::Magick {
                    program: program
                        .clone()
                        .or(configured_program)
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONVERT_PROGRAM)),
                })
            }
            (None, None) => None,
        };
        if let Some(backend) = backend {
            service.backend = backend;
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err(CliError::Config(
                    "--concurrency must be at least 1".to_string(),
                ));
            }
            service.concurrency = concurrency;
        }

        // The process exits once images are returned, so background
        // writes would be lost.
        service.persist = PersistPolicy::Durable;

        Ok(service)
    }
}
