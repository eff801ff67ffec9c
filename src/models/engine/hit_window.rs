//! Distance thresholds used to judge inputs and expire notes.

use super::constants::HIT_LINE_X;
use crate::models::stats::Judgement;

/// How an input relates to the leader note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Outside the outer tolerance. Counts as a miss, the note is kept.
    TooFar,
    /// Inside the outer tolerance but the wrong stroke.
    WrongKey,
    /// Right stroke inside the outer tolerance.
    Hit(Judgement),
}

impl Verdict {
    /// Judgement charged to the run statistics.
    pub fn judgement(self) -> Judgement {
        match self {
            Verdict::TooFar | Verdict::WrongKey => Judgement::Miss,
            Verdict::Hit(j) => j,
        }
    }
}

/// Two-tier tolerance around the hit line.
///
/// Inputs are judged up to `2 * hit_radius` away from the line, while a note
/// only expires once it is `hit_radius` past the line.
#[derive(Debug, Clone, Copy)]
pub struct HitWindow {
    pub hit_line: f64,
    /// Perfect band (note visual radius).
    pub perfect_radius: f64,
    /// Base hit radius.
    pub hit_radius: f64,
}

impl HitWindow {
    pub fn from_radii(perfect_radius: f64, hit_radius: f64) -> Self {
        Self {
            hit_line: HIT_LINE_X,
            perfect_radius,
            hit_radius,
        }
    }

    /// Largest distance at which an input is still judged.
    pub fn outer_tolerance(&self) -> f64 {
        self.hit_radius * 2.0
    }

    pub fn distance(&self, position: f64) -> f64 {
        (position - self.hit_line).abs()
    }

    pub fn judge(&self, distance: f64, kind_matches: bool) -> Verdict {
        if distance > self.outer_tolerance() {
            return Verdict::TooFar;
        }
        if !kind_matches {
            return Verdict::WrongKey;
        }
        if distance <= self.perfect_radius {
            Verdict::Hit(Judgement::Perfect)
        } else {
            Verdict::Hit(Judgement::Good)
        }
    }

    /// True once a scheduled note has crossed the expiry threshold.
    pub fn is_expired(&self, position: f64) -> bool {
        position < self.hit_line - self.hit_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> HitWindow {
        HitWindow::from_radii(30.0, 40.0)
    }

    #[test]
    fn bands_are_inclusive() {
        let w = window();
        assert_eq!(w.judge(0.0, true), Verdict::Hit(Judgement::Perfect));
        assert_eq!(w.judge(30.0, true), Verdict::Hit(Judgement::Perfect));
        assert_eq!(w.judge(30.5, true), Verdict::Hit(Judgement::Good));
        assert_eq!(w.judge(80.0, true), Verdict::Hit(Judgement::Good));
        assert_eq!(w.judge(80.1, true), Verdict::TooFar);
    }

    #[test]
    fn too_far_wins_over_wrong_key() {
        let w = window();
        assert_eq!(w.judge(120.0, false), Verdict::TooFar);
        assert_eq!(w.judge(10.0, false), Verdict::WrongKey);
        assert_eq!(Verdict::WrongKey.judgement(), Judgement::Miss);
    }

    #[test]
    fn judging_is_deterministic() {
        let w = window();
        for d in [0.0, 12.5, 30.0, 55.0, 80.0, 200.0] {
            for matches in [true, false] {
                assert_eq!(w.judge(d, matches), w.judge(d, matches));
            }
        }
    }

    #[test]
    fn expiry_uses_the_inner_radius() {
        let w = window();
        assert!(!w.is_expired(w.hit_line - 40.0));
        assert!(w.is_expired(w.hit_line - 40.5));
        // Between the radius and the outer tolerance behind the line the note
        // is already gone.
        assert!(w.is_expired(w.hit_line - 60.0));
    }
}
