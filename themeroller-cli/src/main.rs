//! ThemeRoller CLI - render and inspect ThemeRoller images
//!
//! This binary drives the `themeroller` library from the command line:
//! rendering images into a directory, printing canonical cache keys, and
//! inspecting the disk cache.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::key::KeyArgs;
use commands::render::RenderArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "themeroller",
    about = "Render and cache jQuery UI ThemeRoller images",
    arg_required_else_help = true,
    version
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ~/.config/themeroller/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render images by canonical filename and write them to a directory
    Render(RenderArgs),

    /// Print the canonical filename (cache key) for a request
    Key(KeyArgs),

    /// Inspect the disk cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Render(args) => commands::render::run(args, config_path),
        Commands::Key(args) => commands::key::run(args),
        Commands::Cache { action } => commands::cache::run(action, config_path),
        Commands::Config { command } => commands::config::run(command, config_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_command() {
        let cli = Cli::try_parse_from([
            "themeroller",
            "-vv",
            "render",
            "ui-icons_222222_256x240.png",
            "ui-bg_flat_75_ffffff_40x100.png",
            "--out",
            "/tmp/images",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.filenames.len(), 2);
                assert_eq!(args.out, PathBuf::from("/tmp/images"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_requires_a_filename() {
        assert!(Cli::try_parse_from(["themeroller", "render"]).is_err());
    }

    #[test]
    fn test_key_accepts_json_or_filename_not_both() {
        assert!(Cli::try_parse_from(["themeroller", "key", "--json", "{}"]).is_ok());
        assert!(Cli::try_parse_from(["themeroller", "key", "x.png", "--json", "{}"]).is_err());
    }
}
