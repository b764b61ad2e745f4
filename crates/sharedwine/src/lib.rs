pub mod config;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod layout;
pub mod locale;
pub mod native;
pub mod plan;
pub mod utils;
pub mod android_host;

#[cfg(test)]
mod test_support;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::Arc;

pub use config::{LaunchConfig, LaunchConfigBuilder, LoggerConfig};
pub use dispatch::{dispatch, initialize_wine, LaunchHandle, LaunchOutcome};
pub use error::{LaunchError, Result};
pub use native::{SharedWineEntry, WineEntry};
pub use plan::{assemble, LaunchPlan};

use crate::utils::logger::Logger;

/// Starts Wine from `<root>` on a background thread, using `WINEPREFIX` for the prefix.
///
/// `cmdline_utf8` may be null or empty to run the default startup command.
///
/// Returns 0 once the loader thread is running, otherwise:
/// 2 = null root, 3 = invalid UTF-8, 4 = configuration error, 5 = thread spawn failure.
/// What happens inside `wine_init` is only logged.
///
/// # Safety
///
/// Non-null pointers must reference NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn sharedwine_initialize(root_utf8: *const c_char, cmdline_utf8: *const c_char) -> i32 {
    Logger::init_logging(None);

    if root_utf8.is_null() {
        log::error!("sharedwine_initialize: root is null");
        return 2;
    }

    let root = match CStr::from_ptr(root_utf8).to_str() {
        Ok(s) => s.to_string(),
        Err(e) => {
            log::error!("sharedwine_initialize: root is not valid UTF-8: {e}");
            return 3;
        }
    };

    let cmdline = if cmdline_utf8.is_null() {
        None
    } else {
        match CStr::from_ptr(cmdline_utf8).to_str() {
            Ok("") => None,
            Ok(s) => Some(s.to_string()),
            Err(e) => {
                log::error!("sharedwine_initialize: cmdline is not valid UTF-8: {e}");
                return 3;
            }
        }
    };

    start(LaunchConfig::from_env(root, cmdline), Arc::new(SharedWineEntry))
}

/// Dispatches `config` and maps the outcome to the status codes of [`sharedwine_initialize`].
fn start(config: LaunchConfig, entry: Arc<dyn WineEntry>) -> i32 {
    match dispatch(config, entry) {
        Ok(_detached) => 0,
        Err(e @ LaunchError::Spawn(_)) => {
            log::error!("sharedwine_initialize: {e}");
            5
        }
        Err(e) => {
            log::error!("sharedwine_initialize: {e}");
            4
        }
    }
}
