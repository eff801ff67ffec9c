//! Active note set, leader election, and the per-frame note pipeline.
//!
//! `ActiveNotes` is the only place that flips `Note::active`. At most one
//! scheduled note is the leader; it is re-elected (earliest `hit_time`, spawn
//! order on ties) whenever the previous leader leaves the scheduled subset.

use super::GameSession;
use crate::models::engine::{HitWindow, NOTE_FADE_SECONDS, NOTE_FALL_SPEED, Note, NoteKind};
use crate::models::stats::Judgement;

/// A note that expired during the last expiry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub kind: NoteKind,
    /// The miss was already charged by a wrong key.
    pub key_mistaken: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ActiveNotes {
    notes: Vec<Note>,
}

impl ActiveNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    /// Adds a freshly spawned note. It leads only if no scheduled note exists.
    pub fn push_spawned(&mut self, mut note: Note) {
        note.spawned = true;
        note.active = !self.notes.iter().any(Note::is_scheduled);
        self.notes.push(note);
    }

    fn leader_index(&self) -> Option<usize> {
        self.notes
            .iter()
            .position(|n| n.active && n.is_scheduled())
    }

    /// The note currently eligible for judging.
    pub fn leader(&self) -> Option<&Note> {
        self.leader_index().map(|i| &self.notes[i])
    }

    /// Flags a wrong stroke against the leader. Returns `false` without a leader.
    pub fn mark_leader_mistaken(&mut self) -> bool {
        match self.leader_index() {
            Some(i) => {
                self.notes[i].key_mistaken = true;
                true
            }
            None => false,
        }
    }

    /// Resolves the leader with a judged hit and elects the next one.
    pub fn hit_leader(&mut self, result: Judgement) -> Option<NoteKind> {
        let index = self.leader_index()?;
        let kind = self.notes[index].kind;
        self.notes[index].start_fade(result, NOTE_FADE_SECONDS);
        self.elect_leader();
        Some(kind)
    }

    /// Marks the earliest scheduled note as leader and every other note as not.
    pub fn elect_leader(&mut self) {
        let mut best: Option<usize> = None;
        for (i, note) in self.notes.iter().enumerate() {
            if !note.is_scheduled() {
                continue;
            }
            match best {
                Some(b) if self.notes[b].hit_time <= note.hit_time => {}
                _ => best = Some(i),
            }
        }
        for (i, note) in self.notes.iter_mut().enumerate() {
            note.active = Some(i) == best;
        }
    }

    /// Scrolls every note left by `dx` pixels.
    pub fn scroll(&mut self, dx: f64) {
        for note in &mut self.notes {
            note.position -= dx;
        }
    }

    /// Moves scheduled notes past the expiry threshold into their falling exit.
    pub fn expire(&mut self, window: &HitWindow) -> Vec<Expired> {
        let mut expired = Vec::new();
        for note in &mut self.notes {
            if note.is_scheduled() && window.is_expired(note.position) {
                expired.push(Expired {
                    kind: note.kind,
                    key_mistaken: note.key_mistaken,
                });
                note.start_fall(NOTE_FADE_SECONDS, NOTE_FALL_SPEED);
            }
        }
        if !expired.is_empty() {
            self.elect_leader();
        }
        expired
    }

    /// Advances exit animations and purges finished notes. Returns how many were purged.
    pub fn advance_exits(&mut self, dt: f64) -> usize {
        let before = self.notes.len();
        self.notes.retain_mut(|note| !note.advance_exit(dt));
        before - self.notes.len()
    }

    /// Number of notes that are both scheduled and active.
    pub fn leader_count(&self) -> usize {
        self.notes
            .iter()
            .filter(|n| n.active && n.is_scheduled())
            .count()
    }
}

impl GameSession {
    /// Position a note spawned at `spawn_time` should have at `clock`.
    fn entry_position(&self, spawn_time: f64) -> f64 {
        let late = (self.clock - spawn_time).max(0.0);
        self.spawn_x - self.scroll_speed * late
    }

    /// Moves every due note from the queue into the active set.
    pub(crate) fn spawn_due_notes(&mut self) {
        while let Some(front) = self.queue.front() {
            if front.spawn_time > self.clock {
                break;
            }
            let position = self.entry_position(front.spawn_time);
            if let Some(mut note) = self.queue.pop_front() {
                note.position = position;
                log::trace!("ENGINE: Spawned {} due at {:.3}s", note.kind, note.hit_time);
                self.notes.push_spawned(note);
            }
        }
    }

    /// Expires overdue notes and charges the misses that were not charged yet.
    pub(crate) fn expire_notes(&mut self) {
        for expired in self.notes.expire(&self.hit_window) {
            if expired.key_mistaken {
                log::debug!("ENGINE: {} expired (already charged)", expired.kind);
                continue;
            }
            log::debug!("ENGINE: {} expired -> Miss", expired.kind);
            self.apply_judgement(Judgement::Miss);
        }
    }

    /// Runs the note part of a playing frame.
    pub(crate) fn update_notes(&mut self, dt: f64) {
        self.notes.scroll(self.scroll_speed * dt);
        // Exits advance before expiry so a note starts falling at full alpha.
        self.notes.advance_exits(dt);
        self.spawn_due_notes();
        self.expire_notes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled(time: f64, position: f64) -> Note {
        let mut note = Note::new(time, NoteKind::Agudo);
        note.position = position;
        note
    }

    #[test]
    fn only_first_spawned_note_leads() {
        let mut notes = ActiveNotes::new();
        notes.push_spawned(scheduled(1.0, 500.0));
        notes.push_spawned(scheduled(1.5, 600.0));
        notes.push_spawned(scheduled(2.0, 700.0));
        assert_eq!(notes.leader_count(), 1);
        assert_eq!(notes.leader().unwrap().hit_time, 1.0);
    }

    #[test]
    fn re_election_picks_earliest_remaining() {
        let mut notes = ActiveNotes::new();
        notes.push_spawned(scheduled(1.0, 100.0));
        notes.push_spawned(scheduled(3.0, 300.0));
        notes.push_spawned(scheduled(2.0, 200.0));

        notes.hit_leader(Judgement::Perfect);
        assert_eq!(notes.leader_count(), 1);
        assert_eq!(notes.leader().unwrap().hit_time, 2.0);

        notes.hit_leader(Judgement::Good);
        assert_eq!(notes.leader().unwrap().hit_time, 3.0);

        notes.hit_leader(Judgement::Good);
        assert!(notes.leader().is_none());
        assert_eq!(notes.leader_count(), 0);
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn ties_keep_spawn_order() {
        let mut notes = ActiveNotes::new();
        notes.push_spawned(scheduled(1.0, 100.0));
        notes.push_spawned(scheduled(2.0, 200.0));
        notes.push_spawned(scheduled(2.0, 210.0));
        notes.hit_leader(Judgement::Perfect);
        assert_eq!(notes.leader().unwrap().position, 200.0);
    }

    #[test]
    fn wrong_key_keeps_the_leader() {
        let mut notes = ActiveNotes::new();
        notes.push_spawned(scheduled(1.0, 100.0));
        assert!(notes.mark_leader_mistaken());
        let leader = notes.leader().unwrap();
        assert!(leader.key_mistaken && leader.is_scheduled());
    }

    #[test]
    fn expiry_hands_over_leadership() {
        let window = HitWindow::from_radii(30.0, 30.0);
        let mut notes = ActiveNotes::new();
        notes.push_spawned(scheduled(1.0, window.hit_line - 31.0));
        notes.push_spawned(scheduled(1.2, window.hit_line + 50.0));

        let expired = notes.expire(&window);
        assert_eq!(expired.len(), 1);
        assert_eq!(notes.leader().unwrap().hit_time, 1.2);
        assert_eq!(notes.leader_count(), 1);
    }

    #[test]
    fn exits_are_purged() {
        let mut notes = ActiveNotes::new();
        notes.push_spawned(scheduled(1.0, 100.0));
        notes.push_spawned(scheduled(2.0, 400.0));
        notes.hit_leader(Judgement::Perfect);
        assert_eq!(notes.advance_exits(NOTE_FADE_SECONDS / 2.0), 0);
        assert_eq!(notes.advance_exits(NOTE_FADE_SECONDS), 1);
        assert_eq!(notes.len(), 1);
        assert!(notes.leader().is_some());
    }
}
