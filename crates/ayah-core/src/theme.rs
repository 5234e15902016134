use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Key the theme is stored under.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon for the toggle button: the sun switches to light, the moon to dark.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Dark => "☀",
            Theme::Light => "☾",
        }
    }
}

/// String key-value persistence for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Opens `path`; a missing or unreadable file starts empty.
    pub fn open(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "Ignoring unreadable preferences: {}", e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ayah").join("preferences.json"))
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Owns the light/dark preference: read once at startup, persisted on each toggle.
pub struct ThemeStore<S: PreferenceStore> {
    store: S,
    current: Theme,
}

impl<S: PreferenceStore> ThemeStore<S> {
    /// Uses the stored theme when present, otherwise the host's `ambient` preference.
    pub fn load(store: S, ambient: Theme) -> Self {
        let current = store
            .get(THEME_KEY)
            .and_then(|v| Theme::from_str(&v))
            .unwrap_or(ambient);
        debug!(theme = current.as_str(), "Theme loaded");
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flips the theme and persists it. A failed write keeps the new theme in memory.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        if let Err(e) = self.store.set(THEME_KEY, self.current.as_str()) {
            warn!("Failed to persist theme: {}", e);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_toggle_without_stored_value() {
        let mut themes = ThemeStore::load(MemoryPreferences::default(), Theme::Light);
        assert_eq!(themes.current(), Theme::Light);

        assert_eq!(themes.toggle(), Theme::Dark);
        assert_eq!(themes.store().get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_stored_value_beats_ambient() {
        let mut prefs = MemoryPreferences::default();
        prefs.set(THEME_KEY, "light").unwrap();
        let themes = ThemeStore::load(prefs, Theme::Dark);
        assert_eq!(themes.current(), Theme::Light);
    }

    #[test]
    fn test_garbage_value_falls_back_to_ambient() {
        let mut prefs = MemoryPreferences::default();
        prefs.set(THEME_KEY, "sepia").unwrap();
        let themes = ThemeStore::load(prefs, Theme::Dark);
        assert_eq!(themes.current(), Theme::Dark);
    }

    #[test]
    fn test_icons() {
        assert_eq!(Theme::Dark.icon(), "☀");
        assert_eq!(Theme::Light.icon(), "☾");
    }

    #[test]
    fn test_file_preferences_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut themes = ThemeStore::load(FilePreferences::open(path.clone()), Theme::Light);
        themes.toggle();

        let reopened = ThemeStore::load(FilePreferences::open(path.clone()), Theme::Light);
        assert_eq!(reopened.current(), Theme::Dark);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let prefs = FilePreferences::open(path);
        assert_eq!(prefs.get(THEME_KEY), None);
    }
}
