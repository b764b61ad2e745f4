use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Variables consulted by [`Locale::detect`], highest priority first.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// A language/country pair, as exposed by the host's active locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    pub country: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en", "US")
    }
}

impl Locale {
    pub fn new(language: &str, country: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: country.to_ascii_uppercase(),
        }
    }

    /// Active locale of the current process, read from the POSIX locale variables.
    pub fn detect() -> Self {
        Self::detect_with(|key| env::var(key).ok())
    }

    pub fn detect_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LOCALE_VARS
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
            .and_then(|value| Self::parse_posix(&value))
            .unwrap_or_default()
    }

    /// Parses `language[_TERRITORY][.codeset][@modifier]`.
    ///
    /// Returns `None` for the portable `C`/`POSIX` locales, which carry no language.
    pub fn parse_posix(value: &str) -> Option<Self> {
        let value = value.trim();
        let name = value.split(['.', '@']).next().unwrap_or_default();
        if name.is_empty() || name == "C" || name == "POSIX" {
            return None;
        }

        let (language, country) = match name.split_once(['_', '-']) {
            Some((language, country)) => (language, country),
            None => (name, ""),
        };
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self::new(language, country))
    }

    /// `<lang>_<COUNTRY>.UTF-8`, the value handed to `LC_ALL` and `LANG`.
    pub fn wine_locale(&self) -> String {
        format!("{}_{}.UTF-8", self.language, self.country)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.language, self.country)
    }
}
