//! Turns a [`LaunchConfig`] into the exact argv/environment pair handed to `wine_init`.

use std::path::Path;

use crate::config::LaunchConfig;
use crate::environment::{self, WineEnvironment};
use crate::error::Result;
use crate::layout::{path_to_string, InstallLayout};
use crate::locale::Locale;

/// Program `wine_init` starts; it hosts the desktop and runs the command line.
pub const EXPLORER: &str = "explorer.exe";
pub const DESKTOP_ARG: &str = "/desktop=shell,,x11";

/// Startup script looked up below `<prefix>/drive_c`.
pub const STARTUP_SCRIPT: &str = "winestart.cmd";
pub const STARTUP_SCRIPT_DOS_PATH: &str = "c:\\winestart.cmd";
pub const FALLBACK_COMMAND: &str = "wineconsole.exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub layout: InstallLayout,
    pub command: String,
    pub argv: Vec<String>,
    pub environment: WineEnvironment,
}

impl LaunchPlan {
    /// Loader path derived from the layout; independent of what `argv` currently holds.
    pub fn loader(&self) -> String {
        path_to_string(&self.layout.loader())
    }
}

pub fn assemble(config: &LaunchConfig) -> Result<LaunchPlan> {
    let prefix = config.require_prefix()?;
    let locale = config.locale.clone().unwrap_or_else(Locale::detect);
    let layout = InstallLayout::new(&config.root);

    let environment = build_environment(&layout, &locale);
    let command = resolve_command(config.cmdline.as_deref(), prefix);
    let argv = vec![
        path_to_string(&layout.loader()),
        EXPLORER.to_string(),
        DESKTOP_ARG.to_string(),
        command.clone(),
    ];

    log::debug!("launch plan: argv={:?} env={:?}", argv, environment);
    Ok(LaunchPlan { layout, command, argv, environment })
}

/// `WINEPREFIX`, `LD_LIBRARY_PATH`, `PATH` and `WINEDEBUGLOG` are intentionally left out.
pub fn build_environment(layout: &InstallLayout, locale: &Locale) -> WineEnvironment {
    let wine_locale = locale.wine_locale();

    let mut env = WineEnvironment::new();
    env.set(environment::WINELOADER, path_to_string(&layout.loader()));
    env.set(environment::WINEDLLPATH, path_to_string(&layout.dll_dir()));
    env.set(environment::LC_ALL, wine_locale.clone());
    env.set(environment::LANG, wine_locale);
    env.set(environment::WINEDEBUG, environment::WINEDEBUG_QUIET);
    env
}

/// A supplied command line is used verbatim, even when empty.
pub fn resolve_command(cmdline: Option<&str>, prefix: &Path) -> String {
    match cmdline {
        Some(cmdline) => cmdline.to_string(),
        None if prefix.join("drive_c").join(STARTUP_SCRIPT).exists() => STARTUP_SCRIPT_DOS_PATH.to_string(),
        None => FALLBACK_COMMAND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::LaunchConfigBuilder;
    use crate::error::LaunchError;
    use crate::test_support::TempDir;

    #[test]
    fn end_to_end_without_startup_script() {
        let config = LaunchConfigBuilder::new("/opt/wine")
            .with_prefix("/home/user/.wine")
            .with_locale(Locale::new("en", "US"))
            .get();

        let plan = assemble(&config).unwrap();
        assert_eq!(plan.loader(), "/opt/wine/bin/wine64");
        assert_eq!(plan.command, "wineconsole.exe");
        assert_eq!(
            plan.argv,
            vec!["/opt/wine/bin/wine64", "explorer.exe", "/desktop=shell,,x11", "wineconsole.exe"]
        );
        assert_eq!(plan.environment.get("WINEDLLPATH"), Some("/opt/wine/lib64/wine"));
        assert_eq!(plan.environment.get("WINELOADER"), Some("/opt/wine/bin/wine64"));
        assert_eq!(plan.environment.get("LC_ALL"), Some("en_US.UTF-8"));
        assert_eq!(plan.environment.get("LANG"), Some("en_US.UTF-8"));
        assert_eq!(plan.environment.get("WINEDEBUG"), Some("-all"));

        let mut keys: Vec<_> = plan.environment.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["LANG", "LC_ALL", "WINEDEBUG", "WINEDLLPATH", "WINELOADER"]);
    }

    #[test]
    fn startup_script_becomes_default_command() {
        let prefix = TempDir::new("prefix");
        let drive_c = prefix.path().join("drive_c");
        std::fs::create_dir_all(&drive_c).unwrap();
        std::fs::write(drive_c.join("winestart.cmd"), b"@echo off\r\n").unwrap();

        assert_eq!(resolve_command(None, prefix.path()), "c:\\winestart.cmd");
        assert_eq!(resolve_command(Some("notepad.exe"), prefix.path()), "notepad.exe");
    }

    #[test]
    fn missing_script_falls_back_to_console() {
        let prefix = TempDir::new("empty-prefix");
        assert_eq!(resolve_command(None, prefix.path()), "wineconsole.exe");
        assert_eq!(resolve_command(Some(""), prefix.path()), "");
    }

    #[test]
    fn loader_survives_an_emptied_argv() {
        let config = LaunchConfigBuilder::new("/opt/wine")
            .with_prefix("/home/user/.wine")
            .with_locale(Locale::new("en", "US"))
            .get();

        let mut plan = assemble(&config).unwrap();
        plan.argv.clear();
        assert_eq!(plan.loader(), "/opt/wine/bin/wine64");
    }

    #[test]
    fn missing_prefix_is_reported() {
        let config = LaunchConfigBuilder::new("/opt/wine").get();
        assert!(matches!(assemble(&config), Err(LaunchError::MissingPrefix)));
    }

    #[test]
    fn winedebug_is_always_quiet() {
        for locale in [Locale::new("ja", "JP"), Locale::new("ru", "")] {
            let env = build_environment(&InstallLayout::new("/x"), &locale);
            assert_eq!(env.get("WINEDEBUG"), Some("-all"));
            for omitted in ["WINEPREFIX", "LD_LIBRARY_PATH", "PATH", "WINEDEBUGLOG"] {
                assert!(!env.contains(omitted), "{omitted} must not be set");
            }
        }
    }
}
