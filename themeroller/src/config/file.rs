//! INI configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{Ini, Properties};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::DEFAULT_CONCURRENCY_LIMIT;
use crate::render::DEFAULT_CONVERT_PROGRAM;
use crate::service::{BackendConfig, PersistPolicy, ServiceConfig};

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ini::ParseError),

    /// A key holds a value that cannot be used.
    #[error("Invalid value for {section}.{key}: {value:?} ({reason})")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSection {
    /// Directory holding cached images.
    pub directory: PathBuf,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            directory: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("themeroller"),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSection {
    /// Rendering engine (`backend` and `convert` keys).
    pub backend: BackendConfig,
    /// Maximum concurrent renders.
    pub concurrency: usize,
    /// Directory holding `icon/mask.png` and `texture/*.png`.
    pub assets: PathBuf,
    /// When waiters are released relative to the disk write.
    pub persist: PersistPolicy,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            concurrency: DEFAULT_CONCURRENCY_LIMIT,
            assets: dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("themeroller")
                .join("template"),
            persist: PersistPolicy::default(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub cache: CacheSection,
    pub render: RenderSection,
}

/// Returns the default configuration file location.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("themeroller")
        .join("config.ini")
}

impl ConfigFile {
    /// Loads [`config_file_path`], falling back to defaults if it is absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::parse(&content)
    }

    /// Parses INI text. Missing keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content)?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("cache")) {
            if let Some(dir) = non_empty(section, "directory") {
                config.cache.directory = expand_tilde(dir);
            }
        }

        if let Some(section) = ini.section(Some("render")) {
            let render = &mut config.render;

            let program = non_empty(section, "convert").unwrap_or(DEFAULT_CONVERT_PROGRAM);
            render.backend = match non_empty(section, "backend") {
                None => BackendConfig::Magick {
                    program: PathBuf::from(program),
                },
                Some(name) => match name.to_lowercase().as_str() {
                    "magick" | "imagemagick" => BackendConfig::Magick {
                        program: PathBuf::from(program),
                    },
                    "raster" => BackendConfig::Raster,
                    _ => {
                        return Err(invalid("render", "backend", name, "expected magick or raster"))
                    }
                },
            };

            if let Some(value) = non_empty(section, "concurrency") {
                render.concurrency = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(invalid(
                            "render",
                            "concurrency",
                            value,
                            "expected a positive integer",
                        ))
                    }
                };
            }

            if let Some(dir) = non_empty(section, "assets") {
                render.assets = expand_tilde(dir);
            }

            if let Some(value) = non_empty(section, "persist") {
                render.persist = PersistPolicy::from_str(value)
                    .map_err(|reason| invalid("render", "persist", value, &reason))?;
            }
        }

        Ok(config)
    }

    /// Builds the service configuration described by this file.
    pub fn to_service_config(&self) -> ServiceConfig {
        ServiceConfig::new(&self.cache.directory, &self.render.assets)
            .with_concurrency(self.render.concurrency)
            .with_persist(self.render.persist)
            .with_backend(self.render.backend.clone())
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &'static str, key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_uses_defaults() {
        assert_eq!(ConfigFile::parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = ConfigFile::parse(
            "[cache]\n\
             directory = /var/cache/themeroller\n\
             \n\
             [render]\n\
             backend = raster\n\
             concurrency = 8\n\
             assets = /usr/share/themeroller/template\n\
             persist = durable\n",
        )
        .unwrap();

        assert_eq!(
            config.cache.directory,
            PathBuf::from("/var/cache/themeroller")
        );
        assert_eq!(config.render.backend, BackendConfig::Raster);
        assert_eq!(config.render.concurrency, 8);
        assert_eq!(
            config.render.assets,
            PathBuf::from("/usr/share/themeroller/template")
        );
        assert_eq!(config.render.persist, PersistPolicy::Durable);
    }

    #[test]
    fn test_parse_custom_convert_program() {
        let config = ConfigFile::parse("[render]\nconvert = /opt/im/bin/convert\n").unwrap();
        assert_eq!(
            config.render.backend,
            BackendConfig::Magick {
                program: PathBuf::from("/opt/im/bin/convert")
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_backend() {
        let err = ConfigFile::parse("[render]\nbackend = gimp\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "backend", .. }
        ));
    }

    #[test]
    fn test_parse_rejects_zero_concurrency() {
        for value in ["0", "-1", "many"] {
            let content = format!("[render]\nconcurrency = {}\n", value);
            assert!(
                ConfigFile::parse(&content).is_err(),
                "accepted concurrency {}",
                value
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_persist_policy() {
        let err = ConfigFile::parse("[render]\npersist = later\n").unwrap_err();
        assert!(err.to_string().contains("render.persist"));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = ConfigFile::parse("[cache]\ndirectory =\n").unwrap();
        assert_eq!(config.cache, CacheSection::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[render]\nconcurrency = 2\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.render.concurrency, 2);
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_to_service_config() {
        let config = ConfigFile::parse(
            "[cache]\ndirectory = /c\n[render]\nassets = /a\nconcurrency = 3\n",
        )
        .unwrap();
        let service = config.to_service_config();

        assert_eq!(service.cache_dir, PathBuf::from("/c"));
        assert_eq!(service.asset_dir, PathBuf::from("/a"));
        assert_eq!(service.concurrency, 3);
        assert_eq!(service.persist, PersistPolicy::Background);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs"), PathBuf::from("/abs"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/cache"), home.join("cache"));
        }
    }

    #[test]
    fn test_config_file_path() {
        assert!(config_file_path().ends_with("themeroller/config.ini"));
    }
}
