//! Paths inside a Wine installation root.
//!
//! ```text
//! <root>/bin/wine64          loader
//! <root>/lib64/libwine.so    shared loader library
//! <root>/lib64/wine          DLL search path
//! ```

use std::path::{Path, PathBuf};

pub const BIN_DIR: &str = "bin";
pub const LIB_DIR: &str = "lib64";
pub const DLL_DIR: &str = "wine";
pub const LOADER_NAME: &str = "wine64";
pub const LIBRARY_NAME: &str = "libwine.so";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    /// The root is taken as-is: a missing or malformed root is not an error here,
    /// the native call will fail on it instead.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join(LIB_DIR)
    }

    pub fn dll_dir(&self) -> PathBuf {
        self.lib_dir().join(DLL_DIR)
    }

    pub fn loader(&self) -> PathBuf {
        self.bin_dir().join(LOADER_NAME)
    }

    pub fn library(&self) -> PathBuf {
        self.lib_dir().join(LIBRARY_NAME)
    }
}

/// Lossy conversion used for everything that crosses the native boundary as text.
pub(crate) fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_loader_and_dll_paths() {
        for root in ["/opt/wine", "/data/data/org.winehq.wine/files/x86_64", "relative/root"] {
            let layout = InstallLayout::new(root);
            assert_eq!(path_to_string(&layout.loader()), format!("{root}/bin/wine64"));
            assert_eq!(path_to_string(&layout.dll_dir()), format!("{root}/lib64/wine"));
            assert_eq!(path_to_string(&layout.library()), format!("{root}/lib64/libwine.so"));
        }
    }

    #[test]
    fn trailing_separator_is_not_doubled() {
        let layout = InstallLayout::new("/opt/wine/");
        assert_eq!(path_to_string(&layout.loader()), "/opt/wine/bin/wine64");
        assert_eq!(path_to_string(&layout.lib_dir()), "/opt/wine/lib64");
    }
}
