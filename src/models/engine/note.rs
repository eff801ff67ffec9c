//! Note categories and the runtime note entity.

use super::constants::{ALPHA_MAX, LANE_CENTER_Y};
use crate::models::stats::Judgement;

/// Drum stroke a note asks for.
///
/// `Flam` is the compound category: it is played by striking the agudo and
/// grave pads together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NoteKind {
    Agudo,
    Grave,
    Mao,
    Flam,
}

/// Static description of a note category.
struct KindInfo {
    kind: NoteKind,
    code: char,
    name: &'static str,
    sound_file: &'static str,
}

const KIND_TABLE: [KindInfo; 4] = [
    KindInfo {
        kind: NoteKind::Agudo,
        code: 'a',
        name: "agudo",
        sound_file: "agudo.wav",
    },
    KindInfo {
        kind: NoteKind::Grave,
        code: 'g',
        name: "grave",
        sound_file: "grave.wav",
    },
    KindInfo {
        kind: NoteKind::Mao,
        code: 'm',
        name: "mao",
        sound_file: "mao.wav",
    },
    KindInfo {
        kind: NoteKind::Flam,
        code: 'f',
        name: "flam",
        sound_file: "flam.wav",
    },
];

impl NoteKind {
    /// Category substituted for unknown chart codes.
    pub const DEFAULT: NoteKind = NoteKind::Agudo;

    pub const ALL: [NoteKind; 4] = [
        NoteKind::Agudo,
        NoteKind::Grave,
        NoteKind::Mao,
        NoteKind::Flam,
    ];

    fn info(self) -> &'static KindInfo {
        // The table is indexed in declaration order.
        &KIND_TABLE[self as usize]
    }

    /// Parses a chart code (case-insensitive).
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_lowercase();
        KIND_TABLE.iter().find(|i| i.code == code).map(|i| i.kind)
    }

    pub fn code(self) -> char {
        self.info().code
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// File name of the stroke sample, relative to the sounds directory.
    pub fn sound_file(self) -> &'static str {
        self.info().sound_file
    }
}

impl std::fmt::Display for NoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Animation state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Scrolling toward the hit line, still judgeable.
    Scheduled,
    /// Judged by a key press, fading out in place.
    Fading,
    /// Expired past the hit line, falling out of the lane.
    Falling,
}

/// A single note of a running session.
#[derive(Debug, Clone)]
pub struct Note {
    /// Clock offset at which the note starts scrolling (seconds).
    pub spawn_time: f64,
    /// Clock offset at which the note is due (seconds).
    pub hit_time: f64,
    pub kind: NoteKind,
    pub spawned: bool,
    /// True for the single note currently eligible for judging.
    pub active: bool,
    /// Horizontal position in pixels.
    pub position: f64,
    /// Vertical position in pixels.
    pub y: f64,
    pub state: NoteState,
    pub result: Option<Judgement>,
    pub fade_elapsed: f64,
    pub fade_total: f64,
    pub alpha: f64,
    pub vertical_velocity: f64,
    /// A wrong key was already charged against this note.
    pub key_mistaken: bool,
}

impl Note {
    /// Creates an inert note due at `time`.
    pub fn new(time: f64, kind: NoteKind) -> Self {
        Self {
            spawn_time: time,
            hit_time: time,
            kind,
            spawned: false,
            active: false,
            position: 0.0,
            y: LANE_CENTER_Y,
            state: NoteState::Scheduled,
            result: None,
            fade_elapsed: 0.0,
            fade_total: 0.0,
            alpha: ALPHA_MAX,
            vertical_velocity: 0.0,
            key_mistaken: false,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == NoteState::Scheduled
    }

    /// Starts the in-place fade after a judged key press.
    pub fn start_fade(&mut self, result: Judgement, duration: f64) {
        self.result = Some(result);
        self.state = NoteState::Fading;
        self.active = false;
        self.fade_elapsed = 0.0;
        self.fade_total = duration;
    }

    /// Starts the falling exit after the note expired.
    pub fn start_fall(&mut self, duration: f64, velocity: f64) {
        self.result = Some(Judgement::Miss);
        self.state = NoteState::Falling;
        self.active = false;
        self.fade_elapsed = 0.0;
        self.fade_total = duration;
        self.vertical_velocity = velocity;
    }

    /// Advances the exit animation. Returns `true` once the note is done.
    pub fn advance_exit(&mut self, dt: f64) -> bool {
        if self.state == NoteState::Scheduled {
            return false;
        }
        if self.state == NoteState::Falling {
            self.y += self.vertical_velocity * dt;
        }
        self.fade_elapsed += dt;
        let progress = if self.fade_total > 0.0 {
            (self.fade_elapsed / self.fade_total).min(1.0)
        } else {
            1.0
        };
        self.alpha = ALPHA_MAX * (1.0 - progress);
        self.fade_elapsed >= self.fade_total || self.alpha <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_resolve_through_the_table() {
        for kind in NoteKind::ALL {
            assert_eq!(NoteKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(NoteKind::from_code('F'), Some(NoteKind::Flam));
        assert_eq!(NoteKind::from_code('x'), None);
        assert_eq!(NoteKind::Mao.sound_file(), "mao.wav");
    }

    #[test]
    fn fading_note_finishes_after_its_duration() {
        let mut note = Note::new(1.0, NoteKind::Grave);
        note.start_fade(Judgement::Good, 0.4);
        assert!(!note.advance_exit(0.2));
        assert!((note.alpha - 127.5).abs() < 1e-9);
        assert!(note.advance_exit(0.2));
        assert_eq!(note.alpha, 0.0);
    }

    #[test]
    fn falling_note_moves_down() {
        let mut note = Note::new(1.0, NoteKind::Agudo);
        let start_y = note.y;
        note.start_fall(0.4, 100.0);
        note.advance_exit(0.1);
        assert!((note.y - (start_y + 10.0)).abs() < 1e-9);
        assert_eq!(note.result, Some(Judgement::Miss));
    }

    #[test]
    fn scheduled_note_never_finishes() {
        let mut note = Note::new(0.0, NoteKind::Mao);
        assert!(!note.advance_exit(10.0));
        assert_eq!(note.alpha, ALPHA_MAX);
    }
}
