pub mod launch_config;
pub mod logger_config;

pub use launch_config::{LaunchConfig, LaunchConfigBuilder, LaunchConfigReader, PREFIX_ENV_VAR};
pub use logger_config::LoggerConfig;
