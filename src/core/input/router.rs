//! Per-pad cooldowns and flam (chord) detection.
//!
//! Key-downs are queued as they arrive and resolved once per frame into note
//! categories. The agudo+grave chord is checked before the single pads so a
//! simultaneous strike is read as one flam, not two strokes. Only pads struck
//! in the resolved frame take part: a pad that is merely held never joins a
//! chord and its cooldown only restarts on its own accepted key-down.

use super::actions::DrumKey;
use crate::models::engine::NoteKind;

const PADS: usize = DrumKey::ALL.len();

/// Pads that together form the compound category.
pub const FLAM_CHORD: (DrumKey, DrumKey) = (DrumKey::Agudo, DrumKey::Grave);

#[derive(Debug, Clone)]
pub struct KeyRouter {
    cooldown: f64,
    last_accepted: [f64; PADS],
    held: [bool; PADS],
    pending: [bool; PADS],
}

impl KeyRouter {
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            last_accepted: [f64::NEG_INFINITY; PADS],
            held: [false; PADS],
            pending: [false; PADS],
        }
    }

    pub fn press(&mut self, key: DrumKey) {
        self.held[key.index()] = true;
        self.pending[key.index()] = true;
    }

    pub fn release(&mut self, key: DrumKey) {
        self.held[key.index()] = false;
    }

    pub fn is_held(&self, key: DrumKey) -> bool {
        self.held[key.index()]
    }

    fn ready(&self, key: DrumKey, now: f64) -> bool {
        now - self.last_accepted[key.index()] >= self.cooldown
    }

    fn accept(&mut self, key: DrumKey, now: f64) {
        self.last_accepted[key.index()] = now;
        self.pending[key.index()] = false;
    }

    /// Turns the key-downs queued since the last call into note categories.
    pub fn resolve(&mut self, now: f64) -> Vec<NoteKind> {
        let mut strokes = Vec::new();
        let (first, second) = FLAM_CHORD;

        if self.pending[first.index()]
            && self.pending[second.index()]
            && self.ready(first, now)
            && self.ready(second, now)
        {
            self.accept(first, now);
            self.accept(second, now);
            strokes.push(NoteKind::Flam);
        }

        for key in DrumKey::ALL {
            if !self.pending[key.index()] {
                continue;
            }
            if self.ready(key, now) {
                self.accept(key, now);
                strokes.push(key.single_kind());
            } else {
                log::trace!("INPUT: {:?} ignored (cooldown)", key);
            }
        }

        self.pending = [false; PADS];
        strokes
    }

    /// Forgets queued presses and held pads (used when gameplay input goes inert).
    pub fn clear(&mut self) {
        self.pending = [false; PADS];
        self.held = [false; PADS];
    }
}
