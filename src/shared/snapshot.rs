//! Render snapshots.
//!
//! Snapshots are immutable captures of the session state handed to the
//! front end. They decouple game logic from drawing.

use crate::models::engine::{NoteKind, NoteState};
use crate::models::stats::{HitStats, Judgement};
use crate::state::game::SessionState;
use crate::state::game::feedback::Repique;

/// One note of the active set as it should be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteView {
    pub x: f64,
    pub y: f64,
    pub kind: NoteKind,
    /// Opacity in `0..=255`.
    pub alpha: f64,
    pub state: NoteState,
    /// The note is the current leader.
    pub active: bool,
}

/// Snapshot of gameplay state for rendering.
#[derive(Clone, Debug)]
pub struct GameplaySnapshot {
    /// Seconds since the session started.
    pub clock: f64,
    pub state: SessionState,

    /// Notes currently in the lane, in spawn order.
    pub notes: Vec<NoteView>,
    /// Notes not spawned yet.
    pub remaining_notes: usize,
    pub hit_line: f64,
    /// Drawn note radius, also the perfect band.
    pub note_radius: f64,
    /// Pads currently held down, indexed like `DrumKey::ALL`.
    pub held_pads: [bool; 3],

    pub hit_stats: HitStats,
    pub last_judgement: Option<Judgement>,

    /// Judgement flash color, if one is showing.
    pub flash_color: Option<[f32; 4]>,
    /// Flash strength in `0..=1`.
    pub flash_intensity: f64,
    pub repique: Repique,

    /// Results overlay opacity (`0..=255`).
    pub overlay_alpha: f64,
    /// Results text opacity (`0..=255`).
    pub results_alpha: f64,
    /// Fade to black when leaving the session (`0..=255`).
    pub exit_alpha: f64,
    pub results_message: Option<String>,
}
