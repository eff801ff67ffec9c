//! User settings persisted in `settings.toml`.

use crate::models::engine::constants::{
    DEFAULT_HIT_RADIUS, DEFAULT_KEY_COOLDOWN, DEFAULT_NOTE_RADIUS, DEFAULT_SCROLL_SPEED,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unable to write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Horizontal scroll speed in pixels per second.
    pub scroll_speed: f64,
    /// Note visual radius, also the perfect band.
    pub note_radius: f64,
    /// Base hit radius (expiry distance, half the outer tolerance).
    pub hit_radius: f64,
    /// Minimum delay between two accepted strokes on the same pad (seconds).
    pub key_cooldown: f64,
    pub master_volume: f32,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            scroll_speed: DEFAULT_SCROLL_SPEED,
            note_radius: DEFAULT_NOTE_RADIUS,
            hit_radius: DEFAULT_HIT_RADIUS,
            key_cooldown: DEFAULT_KEY_COOLDOWN,
            master_volume: 0.5,
        }
    }
}

/// Key names follow winit's `KeyCode` variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindSettings {
    pub agudo: Vec<String>,
    pub grave: Vec<String>,
    pub mao: Vec<String>,
    pub confirm: Vec<String>,
    pub back: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for KeybindSettings {
    fn default() -> Self {
        Self {
            agudo: keys(&["KeyJ"]),
            grave: keys(&["KeyF"]),
            mao: keys(&["Space"]),
            confirm: keys(&["Enter", "NumpadEnter"]),
            back: keys(&["Escape"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_path: PathBuf,
    pub songs_dir: PathBuf,
    /// Directory holding the stroke samples (`agudo.wav`, ...).
    pub sounds_dir: PathBuf,
    /// Player used when none is given on the command line.
    pub player_name: Option<String>,
    pub gameplay: GameplaySettings,
    pub keybinds: KeybindSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/app.db"),
            songs_dir: PathBuf::from("musics"),
            sounds_dir: PathBuf::from("sounds"),
            player_name: None,
            gameplay: GameplaySettings::default(),
            keybinds: KeybindSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings, falling back to defaults when the file is missing or invalid.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::info!("SETTINGS: {:?} not readable ({}), using defaults", path, e);
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("SETTINGS: Failed to parse {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::info!("SETTINGS: Saved {:?}", path);
        Ok(())
    }
}
