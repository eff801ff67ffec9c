//! Snapshot creation for GameSession.

use super::GameSession;
use crate::core::input::actions::DrumKey;
use crate::shared::snapshot::{GameplaySnapshot, NoteView};

impl GameSession {
    /// Creates a snapshot of the current session state for rendering.
    pub fn snapshot(&self) -> GameplaySnapshot {
        let notes = self
            .notes
            .iter()
            .map(|n| NoteView {
                x: n.position,
                y: n.y,
                kind: n.kind,
                alpha: n.alpha,
                state: n.state,
                active: n.active,
            })
            .collect();

        let flash = self.feedback.flash();

        GameplaySnapshot {
            clock: self.clock,
            state: self.state,
            notes,
            remaining_notes: self.queue.len(),
            hit_line: self.hit_window.hit_line,
            note_radius: self.hit_window.perfect_radius,
            held_pads: DrumKey::ALL.map(|key| self.router.is_held(key)),
            hit_stats: self.stats.clone(),
            last_judgement: self.last_judgement,
            flash_color: flash.map(|f| f.color),
            flash_intensity: self.feedback.flash_intensity(),
            repique: self.feedback.repique(),
            overlay_alpha: self.overlay_alpha,
            results_alpha: self.results_alpha,
            exit_alpha: self.exit_alpha,
            results_message: self.results_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{harness, reach_hit_line};
    use crate::core::input::actions::DrumKey;
    use crate::models::engine::{ALPHA_MAX, NoteKind};
    use crate::state::game::SessionState;
    use crate::state::game::feedback::Repique;

    #[test]
    fn snapshot_reflects_the_lane() {
        let mut h = harness(&[(1.0, NoteKind::Agudo), (1.5, NoteKind::Mao)]);
        reach_hit_line(&mut h.session, 1.0);

        let snap = h.session.snapshot();
        assert_eq!(snap.state, SessionState::Playing);
        assert_eq!(snap.notes.len(), 2);
        assert_eq!(snap.remaining_notes, 0);
        assert!(snap.notes[0].active);
        assert!(!snap.notes[1].active);
        assert_eq!(snap.notes[0].alpha, ALPHA_MAX);
        assert_eq!(snap.overlay_alpha, 0.0);
        assert!(snap.flash_color.is_none());

        h.session.judge(NoteKind::Agudo);
        let snap = h.session.snapshot();
        assert_eq!(snap.hit_stats.score, 100);
        assert_eq!(snap.repique, Repique::Perfect);
        assert_eq!(snap.flash_intensity, 1.0);
        assert!(snap.notes[1].active);
    }

    #[test]
    fn held_pads_follow_press_and_release() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        h.session.press(DrumKey::Grave);
        h.session.update(0.016);
        assert_eq!(h.session.snapshot().held_pads, [false, true, false]);

        h.session.release(DrumKey::Grave);
        assert_eq!(h.session.snapshot().held_pads, [false; 3]);
    }
}
