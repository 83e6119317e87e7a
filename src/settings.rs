//! Presentation settings and their persistence in the webview's key-value store.

use std::fmt;
use std::str::FromStr;

use leptos::logging::warn;

pub const THEME_KEY: &str = "theme";
pub const FONT_SIZE_KEY: &str = "fontSize";
pub const LINE_HEIGHT_KEY: &str = "lineHeight";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown setting value `{0}`")]
pub struct UnknownSetting(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not write `{key}` to settings storage")]
pub struct StorageError {
    pub key: String,
}

macro_rules! setting_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownSetting;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownSetting(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

setting_enum!(Theme {
    Auto => "auto",
    Light => "light",
    Dark => "dark",
});

impl Theme {
    /// The concrete theme shown on screen; `Auto` follows the OS preference.
    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            concrete => concrete,
        }
    }

    /// Quick toggle: flips what is on screen, never lands on `Auto`.
    pub fn toggled(self, prefers_dark: bool) -> Theme {
        match self.resolve(prefers_dark) {
            Theme::Light => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

setting_enum!(FontSize {
    Small => "small",
    Medium => "medium",
    Large => "large",
});

impl FontSize {
    pub fn css_value(self) -> &'static str {
        match self {
            FontSize::Small => "0.875rem",
            FontSize::Medium => "1rem",
            FontSize::Large => "1.125rem",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineHeight {
    Tight,
    #[default]
    Normal,
    Relaxed,
}

setting_enum!(LineHeight {
    Tight => "tight",
    Normal => "normal",
    Relaxed => "relaxed",
});

impl LineHeight {
    pub fn css_value(self) -> &'static str {
        match self {
            LineHeight::Tight => "1.4",
            LineHeight::Normal => "1.6",
            LineHeight::Relaxed => "1.8",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub theme: Theme,
    pub font_size: FontSize,
    pub line_height: LineHeight,
}

/// One edit made in the settings form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingChange {
    Theme(Theme),
    FontSize(FontSize),
    LineHeight(LineHeight),
}

impl Settings {
    pub fn with(mut self, change: SettingChange) -> Self {
        match change {
            SettingChange::Theme(theme) => self.theme = theme,
            SettingChange::FontSize(size) => self.font_size = size,
            SettingChange::LineHeight(height) => self.line_height = height,
        }
        self
    }
}

/// String key-value storage the settings persist into.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn read_field<T: FromStr + Default>(store: &impl SettingsStore, key: &str) -> T {
    match store.get(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring stored {key} value {raw:?}");
            T::default()
        }),
        None => T::default(),
    }
}

/// Reads all three settings, substituting defaults for missing or unknown values.
pub fn load(store: &impl SettingsStore) -> Settings {
    Settings {
        theme: read_field(store, THEME_KEY),
        font_size: read_field(store, FONT_SIZE_KEY),
        line_height: read_field(store, LINE_HEIGHT_KEY),
    }
}

pub fn save(store: &impl SettingsStore, settings: &Settings) -> Result<(), StorageError> {
    store.set(THEME_KEY, settings.theme.as_str())?;
    store.set(FONT_SIZE_KEY, settings.font_size.as_str())?;
    store.set(LINE_HEIGHT_KEY, settings.line_height.as_str())
}

pub fn save_theme(store: &impl SettingsStore, theme: Theme) -> Result<(), StorageError> {
    store.set(THEME_KEY, theme.as_str())
}

/// `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl SettingsStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()
            .and_then(|storage| storage.set_item(key, value).ok())
            .ok_or_else(|| StorageError {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore(RefCell<HashMap<String, String>>);

    impl MemoryStore {
        fn value(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key).cloned()
        }
    }

    impl SettingsStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.value(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn empty_store_yields_defaults() {
        let settings = load(&MemoryStore::default());
        assert_eq!(settings.theme, Theme::Auto);
        assert_eq!(settings.font_size, FontSize::Medium);
        assert_eq!(settings.line_height, LineHeight::Normal);
    }

    #[test]
    fn saved_settings_survive_a_fresh_load() {
        let store = MemoryStore::default();
        let saved = Settings {
            theme: Theme::Dark,
            font_size: FontSize::Large,
            line_height: LineHeight::Relaxed,
        };
        save(&store, &saved).unwrap();

        assert_eq!(store.value("fontSize").as_deref(), Some("large"));
        assert_eq!(load(&store), saved);
    }

    #[test]
    fn unknown_values_fall_back_per_field() {
        let store = MemoryStore::default();
        store.set(THEME_KEY, "sepia").unwrap();
        store.set(LINE_HEIGHT_KEY, "tight").unwrap();

        let settings = load(&store);
        assert_eq!(settings.theme, Theme::Auto);
        assert_eq!(settings.line_height, LineHeight::Tight);
    }

    #[test]
    fn toggle_never_lands_on_auto() {
        assert_eq!(Theme::Auto.toggled(true), Theme::Light);
        assert_eq!(Theme::Auto.toggled(false), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(false), Theme::Light);
        assert_eq!(Theme::Light.toggled(true), Theme::Dark);
    }

    #[test]
    fn every_variant_parses_back() {
        for theme in Theme::ALL {
            assert_eq!(theme.as_str().parse::<Theme>(), Ok(*theme));
        }
        assert_eq!("large".parse::<FontSize>(), Ok(FontSize::Large));
        assert!("huge".parse::<FontSize>().is_err());
    }
}
