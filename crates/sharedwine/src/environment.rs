use std::collections::BTreeMap;

pub const WINELOADER: &str = "WINELOADER";
pub const WINEDLLPATH: &str = "WINEDLLPATH";
pub const LC_ALL: &str = "LC_ALL";
pub const LANG: &str = "LANG";
pub const WINEDEBUG: &str = "WINEDEBUG";

/// Debug channel spec that silences every channel.
pub const WINEDEBUG_QUIET: &str = "-all";

/// Environment handed to the native loader.
///
/// Built fresh for every launch and consumed by exactly one native call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WineEnvironment {
    vars: BTreeMap<String, String>,
}

impl WineEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `[key0, value0, key1, value1, ...]`, the layout `wine_init` expects.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.vars.len() * 2);
        for (key, value) in &self.vars {
            out.push(key.clone());
            out.push(value.clone());
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WineEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flatten_alternates_keys_and_values() {
        let env: WineEnvironment =
            [("WINEDEBUG", "-all"), ("LANG", "en_US.UTF-8"), ("WINELOADER", "/opt/wine/bin/wine64")]
                .into_iter()
                .collect();

        let flat = env.flatten();
        assert_eq!(flat.len(), env.len() * 2);

        let mut seen = HashSet::new();
        for pair in flat.chunks(2) {
            assert!(seen.insert(pair[0].clone()), "duplicate key {}", pair[0]);
            assert_eq!(env.get(&pair[0]), Some(pair[1].as_str()));
        }
        assert_eq!(seen.len(), env.len());
    }

    #[test]
    fn set_replaces_existing_key() {
        let mut env = WineEnvironment::new();
        env.set(LANG, "de_DE.UTF-8");
        env.set(LANG, "fr_FR.UTF-8");
        assert_eq!(env.len(), 1);
        assert_eq!(env.flatten(), vec!["LANG".to_string(), "fr_FR.UTF-8".to_string()]);
    }

    #[test]
    fn empty_environment_flattens_to_nothing() {
        let env = WineEnvironment::new();
        assert!(env.is_empty());
        assert!(env.flatten().is_empty());
    }
}
