use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Logger configuration used by the launcher.
///
/// `app_level_filter` applies to this crate's own records, `level_filter` to everything else.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub app_level_filter: LevelFilter,
    pub level_filter: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { app_level_filter: LevelFilter::Info, level_filter: LevelFilter::Warn }
    }
}

impl LoggerConfig {
    pub fn verbose() -> Self {
        Self { app_level_filter: LevelFilter::Debug, level_filter: LevelFilter::Info }
    }
}
