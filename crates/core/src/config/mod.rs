//! Optional TOML configuration: defaults for the search and logging.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path};
pub use types::{ConfigFile, DefaultsConfig, LoggingConfig, ResolvedConfig};
