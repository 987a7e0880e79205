//! Process-level plumbing shared by the roster binaries: layered
//! configuration, home directory resolution and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
pub use logging::init_logging_from_config;
pub use paths::{resolve_home_dir, HomeDirError};
