use std::ffi::{c_char, c_int, CString};
use std::sync::Mutex;

use crate::environment::WineEnvironment;
use crate::error::{LaunchError, Result};
use crate::native::library::ensure_loaded;
use crate::plan::LaunchPlan;

pub const WINE_INIT_SYMBOL: &str = "wine_init";

/// Size of the diagnostic buffer handed to `wine_init`.
pub const ERROR_BUFFER_LEN: usize = 1024;

/// `void wine_init( int argc, char *argv[], char *error, int error_size )`
type WineInitFn = unsafe extern "C" fn(c_int, *mut *mut c_char, *mut c_char, c_int);

/// The native call boundary.
///
/// Implementations run on the loader thread and return the diagnostic string produced by
/// the native side. The diagnostic is never interpreted: an empty string does not mean
/// success and a non-empty one does not mean failure.
pub trait WineEntry: Send + Sync {
    fn init(&self, plan: &LaunchPlan) -> Result<String>;
}

/// Calls `wine_init` exported by `<root>/lib64/libwine.so` through the C ABI.
///
/// The C entry reads the process environment, so the launch environment is exported right
/// before the call and stays in place until the call returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct SharedWineEntry;

static ENV_LOCK: Mutex<()> = Mutex::new(());

impl WineEntry for SharedWineEntry {
    fn init(&self, plan: &LaunchPlan) -> Result<String> {
        let argv = to_c_strings(&plan.argv)?;
        let library = ensure_loaded(&plan.layout.library())?;
        // SAFETY: wine_init has the WineInitFn signature in every libwine that exports it.
        let wine_init: WineInitFn = unsafe { library.symbol(WINE_INIT_SYMBOL)? };

        let mut argv_ptrs: Vec<*mut c_char> = argv.iter().map(|s| s.as_ptr() as *mut c_char).collect();
        argv_ptrs.push(std::ptr::null_mut());
        let mut error = vec![0 as c_char; ERROR_BUFFER_LEN];

        with_environment(&plan.environment, || {
            log::info!("calling {} with {:?}", WINE_INIT_SYMBOL, plan.argv);
            // SAFETY: argv_ptrs is NULL-terminated and its strings outlive the call; the error
            // buffer length matches error_size.
            unsafe {
                wine_init(plan.argv.len() as c_int, argv_ptrs.as_mut_ptr(), error.as_mut_ptr(), error.len() as c_int);
            }
        })?;

        Ok(read_error_buffer(&error))
    }
}

fn to_c_strings(args: &[String]) -> Result<Vec<CString>> {
    args.iter()
        .map(|s| CString::new(s.as_str()).map_err(|_| LaunchError::InvalidArgument(format!("{s:?} contains NUL"))))
        .collect()
}

/// Exports `env` into the process environment and runs `call` while no other launch can
/// change it.
///
/// The lock is held until `call` returns. A `wine_init` that never returns keeps it, which only
/// blocks further launches of a process that already hosts Wine.
pub(crate) fn with_environment<R>(env: &WineEnvironment, call: impl FnOnce() -> R) -> Result<R> {
    let _guard = match ENV_LOCK.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    apply_environment(env)?;
    Ok(call())
}

fn apply_environment(env: &WineEnvironment) -> Result<()> {
    for (key, value) in env.iter() {
        if key.is_empty() || key.contains(['=', '\0']) || value.contains('\0') {
            return Err(LaunchError::InvalidArgument(format!("environment entry {key:?}={value:?}")));
        }
    }
    for (key, value) in env.iter() {
        std::env::set_var(key, value);
    }
    Ok(())
}

fn read_error_buffer(buf: &[c_char]) -> String {
    // The native side may fill the buffer completely; never read past it.
    let bytes: Vec<u8> = buf.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchConfigBuilder;
    use crate::locale::Locale;
    use crate::plan::assemble;

    fn plan_for(root: &str) -> LaunchPlan {
        let config = LaunchConfigBuilder::new(root)
            .with_prefix("/nonexistent/prefix")
            .with_locale(Locale::new("en", "US"))
            .get();
        assemble(&config).unwrap()
    }

    #[test]
    fn missing_libwine_is_a_load_error() {
        let err = SharedWineEntry.init(&plan_for("/nonexistent/wine")).unwrap_err();
        match err {
            LaunchError::LibraryLoad { path, .. } => {
                assert_eq!(path, std::path::Path::new("/nonexistent/wine/lib64/libwine.so"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn interior_nul_is_rejected_before_loading() {
        let mut plan = plan_for("/nonexistent/wine");
        plan.argv[3] = "bad\0cmd".to_string();
        assert!(matches!(SharedWineEntry.init(&plan), Err(LaunchError::InvalidArgument(_))));
    }

    #[test]
    fn error_buffer_stops_at_nul_or_end() {
        let mut buf = vec![0 as c_char; 8];
        for (i, b) in b"boom".iter().enumerate() {
            buf[i] = *b as c_char;
        }
        assert_eq!(read_error_buffer(&buf), "boom");

        let full = vec![b'x' as c_char; 4];
        assert_eq!(read_error_buffer(&full), "xxxx");
        assert_eq!(read_error_buffer(&[0; 4]), "");
    }

    #[test]
    fn malformed_environment_is_rejected() {
        let env: WineEnvironment = [("BAD=KEY", "v")].into_iter().collect();
        assert!(matches!(apply_environment(&env), Err(LaunchError::InvalidArgument(_))));
    }
}
