//! Configuration CLI commands.

use std::path::Path;

use clap::Subcommand;
use themeroller::config::{config_file_path, ConfigFile};
use themeroller::service::BackendConfig;

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            print!("{}", render(&load_config(config_path)?));
            Ok(())
        }
        ConfigCommands::Path => {
            match config_path {
                Some(path) => println!("{}", path.display()),
                None => println!("{}", config_file_path().display()),
            }
            Ok(())
        }
    }
}

/// Formats the configuration as INI.
fn render(config: &ConfigFile) -> String {
    let (backend, convert) = match &config.render.backend {
        BackendConfig::Magick { program } => ("magick", Some(program.display().to_string())),
        BackendConfig::Raster => ("raster", None),
    };

    let mut out = String::new();
    out.push_str("[cache]\n");
    out.push_str(&format!("directory = {}\n", config.cache.directory.display()));
    out.push_str("\n[render]\n");
    out.push_str(&format!("backend = {}\n", backend));
    if let Some(convert) = convert {
        out.push_str(&format!("convert = {}\n", convert));
    }
    out.push_str(&format!("concurrency = {}\n", config.render.concurrency));
    out.push_str(&format!("assets = {}\n", config.render.assets.display()));
    out.push_str(&format!("persist = {}\n", config.render.persist));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trips_through_parser() {
        let original = ConfigFile::parse(
            "[cache]\ndirectory = /c\n[render]\nbackend = raster\nconcurrency = 3\nassets = /a\npersist = durable\n",
        )
        .unwrap();

        let reparsed = ConfigFile::parse(&render(&original)).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_render_lists_convert_for_magick() {
        let text = render(&ConfigFile::default());
        assert!(text.contains("backend = magick"));
        assert!(text.contains("convert = convert"));
    }
}
