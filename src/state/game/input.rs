//! Stroke resolution and judging for GameSession.

use super::GameSession;
use crate::models::engine::{NoteKind, Verdict};
use crate::models::stats::Judgement;

impl GameSession {
    /// Resolves the strokes queued since the last frame and judges each one.
    pub(crate) fn process_inputs(&mut self) {
        for kind in self.router.resolve(self.clock) {
            self.judge(kind);
        }
    }

    /// Judges one stroke against the leader note.
    ///
    /// A stroke with no leader, or too far from the hit line, is a miss that
    /// leaves every note untouched. A wrong stroke inside the window flags the
    /// leader so its later expiry is not charged twice.
    pub fn judge(&mut self, kind: NoteKind) -> Judgement {
        let Some(leader) = self.notes.leader() else {
            log::debug!("ENGINE: {} with no note in play -> Miss", kind);
            self.apply_judgement(Judgement::Miss);
            return Judgement::Miss;
        };

        let distance = self.hit_window.distance(leader.position);
        let verdict = self.hit_window.judge(distance, leader.kind == kind);

        match verdict {
            Verdict::TooFar => {
                log::debug!("ENGINE: {} too far ({:.1}px) -> Miss", kind, distance);
            }
            Verdict::WrongKey => {
                log::debug!("ENGINE: {} on a {} note -> Miss", kind, leader.kind);
                self.notes.mark_leader_mistaken();
            }
            Verdict::Hit(judgement) => {
                log::debug!("ENGINE: {} at {:.1}px -> {:?}", kind, distance, judgement);
                self.notes.hit_leader(judgement);
                self.audio.play_effect(kind);
            }
        }

        let judgement = verdict.judgement();
        self.apply_judgement(judgement);
        judgement
    }

    /// Counts a judgement and triggers its feedback.
    pub(crate) fn apply_judgement(&mut self, judgement: Judgement) {
        self.stats.apply(judgement);
        self.feedback.trigger(judgement);
        self.last_judgement = Some(judgement);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{harness, reach_hit_line};
    use super::*;
    use crate::state::game::feedback::Repique;

    #[test]
    fn judging_is_deterministic() {
        let mut a = harness(&[(1.0, NoteKind::Grave)]);
        let mut b = harness(&[(1.0, NoteKind::Grave)]);
        reach_hit_line(&mut a.session, 1.0);
        reach_hit_line(&mut b.session, 1.0);
        a.session.notes.scroll(-40.0);
        b.session.notes.scroll(-40.0);
        assert_eq!(a.session.judge(NoteKind::Grave), b.session.judge(NoteKind::Grave));
        assert_eq!(a.session.stats, b.session.stats);
    }

    #[test]
    fn every_judgement_triggers_feedback() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        h.session.judge(NoteKind::Mao);
        assert_eq!(h.session.feedback.repique(), Repique::Error);
        assert!(h.session.feedback.flash().is_some());

        reach_hit_line(&mut h.session, 1.0);
        h.session.judge(NoteKind::Agudo);
        assert_eq!(h.session.feedback.repique(), Repique::Perfect);
    }

    #[test]
    fn wrong_key_does_not_play_a_sample() {
        let mut h = harness(&[(1.0, NoteKind::Agudo)]);
        reach_hit_line(&mut h.session, 1.0);
        h.session.judge(NoteKind::Mao);
        assert!(
            !h.audio
                .borrow()
                .events
                .iter()
                .any(|e| e.starts_with("effect"))
        );
    }
}
