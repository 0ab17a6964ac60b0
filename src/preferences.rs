//! Preference manager that merges config.toml defaults with stored overrides.
//!
//! Config values serve as defaults; values saved at runtime (currently the
//! theme) live in the key-value store and override them. Writes go to the
//! store, never to the config file.
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::storage::{KeyValueStore, StorageError, THEME_KEY};

/// Preferences that persist, paired with their store key.
const PERSISTED: &[(&str, &str)] = &[("theme", THEME_KEY)];

fn store_key(pref: &str) -> Option<&'static str> {
    PERSISTED
        .iter()
        .find(|(name, _)| *name == pref)
        .map(|(_, key)| *key)
}

/// Merged preferences: config defaults plus stored overrides.
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceManager {
    /// Flatten `config`, then layer stored values on top.
    ///
    /// A stored value that is not a JSON string is ignored with a warning.
    pub fn load(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let mut prefs = Self::flatten_config(config);

        for (name, key) in PERSISTED {
            let Some(raw) = store.get(key)? else {
                continue;
            };
            match serde_json::from_str::<String>(&raw) {
                Ok(value) => {
                    prefs.insert((*name).to_string(), value);
                }
                Err(e) => tracing::warn!(key, error = %e, "Ignoring malformed stored preference"),
            }
        }

        Ok(Self { prefs, store })
    }

    /// Config values only; stored overrides are not read.
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            prefs: Self::flatten_config(config),
            store,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Update a preference, persisting it when it has a store key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(store_key) = store_key(key) {
            let json = serde_json::to_string(value)?;
            self.store.set(store_key, &json)?;
        }
        self.prefs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Current theme variant name.
    pub fn theme_variant(&self) -> &str {
        self.get("theme").unwrap_or("dark")
    }

    /// Keybinding overrides as action name → key string.
    pub fn keybinding_overrides(&self) -> HashMap<String, String> {
        self.prefs
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix("keybind.")
                    .map(|action| (action.to_string(), v.clone()))
            })
            .collect()
    }

    fn flatten_config(config: &Config) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("theme".to_string(), config.theme.clone());
        for (action, key_str) in &config.keybindings {
            map.insert(format!("keybind.{}", action), key_str.clone());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_from_config() {
        let pm = PreferenceManager::load(&Config::default(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(pm.theme_variant(), "dark");
        assert!(pm.keybinding_overrides().is_empty());
    }

    #[test]
    fn test_stored_theme_overrides_config() {
        let store = Arc::new(MemoryStore::with_value(THEME_KEY, "\"light\""));
        let pm = PreferenceManager::load(&Config::default(), store).unwrap();
        assert_eq!(pm.theme_variant(), "light");
    }

    #[test]
    fn test_malformed_stored_theme_ignored() {
        let store = Arc::new(MemoryStore::with_value(THEME_KEY, "light"));
        let pm = PreferenceManager::load(&Config::default(), store).unwrap();
        assert_eq!(pm.theme_variant(), "dark");
    }

    #[test]
    fn test_set_persists_theme() {
        let store = Arc::new(MemoryStore::new());
        let mut pm = PreferenceManager::load(&Config::default(), store.clone()).unwrap();
        pm.set("theme", "light").unwrap();
        assert_eq!(pm.theme_variant(), "light");
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("\"light\""));

        let reloaded = PreferenceManager::load(&Config::default(), store).unwrap();
        assert_eq!(reloaded.theme_variant(), "light");
    }

    #[test]
    fn test_unpersisted_key_stays_in_memory() {
        let store = Arc::new(MemoryStore::new());
        let mut pm = PreferenceManager::from_config(&Config::default(), store.clone());
        pm.set("scratch", "1").unwrap();
        assert_eq!(pm.get("scratch"), Some("1"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_keybindings_flattened() {
        let mut config = Config::default();
        config
            .keybindings
            .insert("quit".to_string(), "Ctrl+q".to_string());
        let pm = PreferenceManager::from_config(&config, Arc::new(MemoryStore::new()));
        assert_eq!(pm.get("keybind.quit"), Some("Ctrl+q"));
        assert_eq!(
            pm.keybinding_overrides().get("quit").map(String::as_str),
            Some("Ctrl+q")
        );
    }
}
