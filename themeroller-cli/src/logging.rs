//! Log output for the CLI.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "themeroller=info";

/// Chooses the log filter: `-v` flags win, then `RUST_LOG`, then the default.
fn filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        1 => EnvFilter::new("themeroller=debug"),
        _ => EnvFilter::new("themeroller=trace"),
    }
}

/// Installs the global subscriber, writing to stderr so stdout stays
/// clean for command output.
pub fn init(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
