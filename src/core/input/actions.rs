//! Canonical action enums shared between input layers.

use crate::models::engine::NoteKind;

/// Physical drum pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumKey {
    Agudo,
    Grave,
    Mao,
}

impl DrumKey {
    pub const ALL: [DrumKey; 3] = [DrumKey::Agudo, DrumKey::Grave, DrumKey::Mao];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Category produced when this pad is struck alone.
    pub fn single_kind(self) -> NoteKind {
        match self {
            DrumKey::Agudo => NoteKind::Agudo,
            DrumKey::Grave => NoteKind::Grave,
            DrumKey::Mao => NoteKind::Mao,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UIAction {
    /// Confirm (Enter). On the results screen it leaves the session.
    Confirm,
    /// Back (Escape). Leaves the session early while playing.
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Drum(DrumKey),
    UI(UIAction),
    None,
}

/// A resolved keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Press(DrumKey),
    Release(DrumKey),
    UI(UIAction),
}

/// Pads struck to play a note category.
pub fn pads_for(kind: NoteKind) -> &'static [DrumKey] {
    match kind {
        NoteKind::Agudo => &[DrumKey::Agudo],
        NoteKind::Grave => &[DrumKey::Grave],
        NoteKind::Mao => &[DrumKey::Mao],
        NoteKind::Flam => &[DrumKey::Agudo, DrumKey::Grave],
    }
}
