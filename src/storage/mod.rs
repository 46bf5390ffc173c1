//! Storage for configuration files and well-known paths.

pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, ResolvedConfig,
    ENV_CONFIG, ENV_USER_ID, ENV_WEBHOOK_URL,
};
pub use paths::AppPaths;
