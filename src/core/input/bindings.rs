use super::actions::{DrumKey, KeyAction, UIAction};
use crate::models::settings::KeybindSettings;
use std::collections::HashMap;
use winit::keyboard::KeyCode;

#[derive(Clone, Debug)]
pub struct KeyBindings {
    drum_binds: HashMap<KeyCode, DrumKey>,
    ui_binds: HashMap<KeyCode, UIAction>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::from_settings(&KeybindSettings::default())
    }

    /// Builds the bindings from the settings file, skipping unknown key names.
    pub fn from_settings(settings: &KeybindSettings) -> Self {
        let mut bindings = Self {
            drum_binds: HashMap::new(),
            ui_binds: HashMap::new(),
        };

        // UI first so a drum pad bound to the same key wins.
        for (names, action) in [
            (&settings.confirm, UIAction::Confirm),
            (&settings.back, UIAction::Back),
        ] {
            for keycode in parse_all(names) {
                bindings.ui_binds.insert(keycode, action);
            }
        }

        for (names, key) in [
            (&settings.agudo, DrumKey::Agudo),
            (&settings.grave, DrumKey::Grave),
            (&settings.mao, DrumKey::Mao),
        ] {
            for keycode in parse_all(names) {
                bindings.ui_binds.remove(&keycode);
                bindings.drum_binds.insert(keycode, key);
            }
        }

        for key in DrumKey::ALL {
            if !bindings.drum_binds.values().any(|k| *k == key) {
                log::warn!("INPUT: No key bound to the {:?} pad", key);
            }
        }

        bindings
    }

    pub fn resolve(&self, key: KeyCode) -> KeyAction {
        if let Some(drum) = self.drum_binds.get(&key) {
            KeyAction::Drum(*drum)
        } else if let Some(action) = self.ui_binds.get(&key) {
            KeyAction::UI(*action)
        } else {
            KeyAction::None
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_all(names: &[String]) -> Vec<KeyCode> {
    names
        .iter()
        .filter_map(|name| {
            let keycode = parse_keycode(name);
            if keycode.is_none() {
                log::warn!("INPUT: Unknown keycode in settings: {}", name);
            }
            keycode
        })
        .collect()
}

macro_rules! keycode_names {
    ($name:expr; $($code:ident),* $(,)?) => {
        match $name {
            $(stringify!($code) => Some(KeyCode::$code),)*
            _ => None,
        }
    };
}

/// Maps a winit `KeyCode` variant name (`"KeyJ"`, `"Space"`) to the key.
pub fn parse_keycode(s: &str) -> Option<KeyCode> {
    keycode_names!(s;
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
        KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
        Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,
        Numpad0, Numpad1, Numpad2, Numpad3, Numpad4, Numpad5, Numpad6, Numpad7, Numpad8,
        Numpad9, NumpadEnter,
        Space, Enter, Escape, Backspace, Tab,
        ShiftLeft, ShiftRight, ControlLeft, ControlRight, AltLeft, AltRight,
        ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
        Semicolon, Quote, Comma, Period, Slash, Backslash, BracketLeft, BracketRight,
        Minus, Equal,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.resolve(KeyCode::KeyJ), KeyAction::Drum(DrumKey::Agudo));
        assert_eq!(bindings.resolve(KeyCode::KeyF), KeyAction::Drum(DrumKey::Grave));
        assert_eq!(bindings.resolve(KeyCode::Space), KeyAction::Drum(DrumKey::Mao));
        assert_eq!(bindings.resolve(KeyCode::Enter), KeyAction::UI(UIAction::Confirm));
        assert_eq!(bindings.resolve(KeyCode::KeyQ), KeyAction::None);
    }

    #[test]
    fn drum_binding_overrides_ui_binding() {
        let settings = KeybindSettings {
            mao: vec!["Enter".to_string(), "NotAKey".to_string()],
            ..KeybindSettings::default()
        };
        let bindings = KeyBindings::from_settings(&settings);
        assert_eq!(bindings.resolve(KeyCode::Enter), KeyAction::Drum(DrumKey::Mao));
        assert_eq!(bindings.resolve(KeyCode::Space), KeyAction::None);
    }

    #[test]
    fn parses_names() {
        assert_eq!(parse_keycode("KeyJ"), Some(KeyCode::KeyJ));
        assert_eq!(parse_keycode("NumpadEnter"), Some(KeyCode::NumpadEnter));
        assert_eq!(parse_keycode("keyj"), None);
    }
}
