//! Process-level plumbing shared by the server binary: layered configuration,
//! logging bootstrap and home directory resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    AppConfig, AppConfigProvider, CliArgs, ConfigProvider, DatabaseConfig, LoggingConfig,
    Section, ServerConfig,
};
