use std::sync::Once;

use crate::config::LoggerConfig;

static INIT: Once = Once::new();

pub struct Logger;

impl Logger {
    /// Installs the process logger. Only the first call has an effect; a logger installed by
    /// the host beforehand is left alone.
    pub fn init_logging(config: Option<LoggerConfig>) {
        let config = config.unwrap_or_default();
        INIT.call_once(|| install(config));
    }
}

#[cfg(not(target_os = "android"))]
fn install(config: LoggerConfig) {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::White)
        .trace(Color::BrightBlack);

    let res = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .level(config.level_filter)
        .level_for(env!("CARGO_CRATE_NAME"), config.app_level_filter)
        .chain(std::io::stderr())
        .apply();

    if let Err(e) = res {
        eprintln!("sharedwine: logger not installed: {e}");
    }
}

#[cfg(target_os = "android")]
fn install(config: LoggerConfig) {
    use android_logger::Config;

    android_logger::init_once(
        Config::default()
            .with_max_level(config.app_level_filter.max(config.level_filter))
            .with_tag("sharedwine"),
    );
}
