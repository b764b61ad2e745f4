//! Process-wide registry of shared objects opened with `dlopen`.
//!
//! Loading the same library twice (a second launch, or a host that already mapped it) is not an
//! error: [`ensure_loaded`] hands back the instance opened first. Failed loads are not cached.

use std::collections::HashMap;
use std::ffi::{c_void, CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{LaunchError, Result};

pub struct SharedLibrary {
    path: PathBuf,
    handle: *mut c_void,
}

// SAFETY: a dlopen handle is an opaque token; libdl is thread-safe.
unsafe impl Send for SharedLibrary {}
unsafe impl Sync for SharedLibrary {}

impl std::fmt::Debug for SharedLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLibrary").field("path", &self.path).field("handle", &self.handle).finish()
    }
}

impl SharedLibrary {
    fn open(path: &Path) -> Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| LaunchError::InvalidArgument(format!("library path {} contains NUL", path.display())))?;

        // SAFETY: c_path is NUL-terminated and outlives the call.
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            return Err(LaunchError::LibraryLoad { path: path.to_path_buf(), reason: last_dl_error() });
        }
        Ok(Self { path: path.to_path_buf(), handle })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves `name` to a value of type `T`.
    ///
    /// # Safety
    ///
    /// `T` must be a pointer-sized type (normally an `extern` fn pointer) matching the real
    /// signature of the symbol.
    pub unsafe fn symbol<T: Copy>(&self, name: &str) -> Result<T> {
        debug_assert_eq!(std::mem::size_of::<T>(), std::mem::size_of::<*mut c_void>());

        let c_name = CString::new(name)
            .map_err(|_| LaunchError::InvalidArgument(format!("symbol name {name:?} contains NUL")))?;

        // Clear any stale error so a NULL result can be told apart from a NULL-valued symbol.
        libc::dlerror();
        let sym = libc::dlsym(self.handle, c_name.as_ptr());
        if sym.is_null() {
            return Err(LaunchError::SymbolNotFound { symbol: name.to_string(), reason: last_dl_error() });
        }
        Ok(std::mem::transmute_copy::<*mut c_void, T>(&sym))
    }
}

impl Drop for SharedLibrary {
    fn drop(&mut self) {
        // SAFETY: handle came from a successful dlopen and is closed exactly once.
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

fn last_dl_error() -> String {
    // SAFETY: dlerror returns NULL or a NUL-terminated thread-local string.
    unsafe {
        let msg = libc::dlerror();
        if msg.is_null() {
            "unknown dynamic loader error".to_string()
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }
}

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<SharedLibrary>>> {
    static LOADED: OnceLock<Mutex<HashMap<PathBuf, Arc<SharedLibrary>>>> = OnceLock::new();
    LOADED.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Loads the shared object at `path` unless this process already did.
pub fn ensure_loaded(path: &Path) -> Result<Arc<SharedLibrary>> {
    let mut loaded = match registry().lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };

    if let Some(lib) = loaded.get(path) {
        log::debug!("{} already loaded", path.display());
        return Ok(lib.clone());
    }

    let lib = Arc::new(SharedLibrary::open(path)?);
    log::info!("loaded {}", lib.path().display());
    loaded.insert(path.to_path_buf(), lib.clone());
    Ok(lib)
}

pub fn is_loaded(path: &Path) -> bool {
    match registry().lock() {
        Ok(g) => g.contains_key(path),
        Err(poisoned) => poisoned.into_inner().contains_key(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_not_cached() {
        let path = Path::new("/nonexistent/lib64/libwine.so");
        for _ in 0..2 {
            match ensure_loaded(path) {
                Err(LaunchError::LibraryLoad { path: p, reason }) => {
                    assert_eq!(p, path);
                    assert!(!reason.is_empty());
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert!(!is_loaded(path));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn loading_twice_returns_the_same_instance() {
        let path = Path::new("libm.so.6");
        let first = ensure_loaded(path).unwrap();
        let second = ensure_loaded(path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(is_loaded(path));
        assert_eq!(first.path(), path);

        let cos: extern "C" fn(f64) -> f64 = unsafe { first.symbol("cos").unwrap() };
        assert_eq!(cos(0.0), 1.0);
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn unknown_symbol_is_reported() {
        let lib = ensure_loaded(Path::new("libm.so.6")).unwrap();
        let err = unsafe { lib.symbol::<extern "C" fn()>("wine_init_does_not_exist") }.unwrap_err();
        assert!(matches!(err, LaunchError::SymbolNotFound { .. }));
    }
}
