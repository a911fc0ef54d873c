//! Configuration file support.
//!
//! Settings are read from an INI file, by default
//! `~/.config/themeroller/config.ini`:
//!
//! ```ini
//! [cache]
//! directory = /var/cache/themeroller
//!
//! [render]
//! backend = magick
//! concurrency = 4
//! assets = /usr/share/themeroller/template
//! convert = convert
//! persist = background
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

mod file;
mod size;

pub use file::{config_file_path, CacheSection, ConfigError, ConfigFile, RenderSection};
pub use size::format_size;
