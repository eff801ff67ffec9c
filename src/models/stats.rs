//! Hit statistics and judgement types.

use crate::models::engine::constants::{GOOD_SCORE, PERFECT_SCORE};

/// RGBA colors for each judgement type.
#[derive(Clone, Debug)]
pub struct JudgementColors {
    pub perfect: [f32; 4],
    pub good: [f32; 4],
    pub miss: [f32; 4],
}

impl JudgementColors {
    /// Creates default judgement colors.
    pub fn new() -> Self {
        Self {
            perfect: [1.0, 1.0, 0.0, 1.0], // Yellow
            good: [0.0, 1.0, 0.0, 1.0],    // Green
            miss: [1.0, 0.0, 0.0, 1.0],    // Red
        }
    }

    pub fn for_judgement(&self, judgement: Judgement) -> [f32; 4] {
        match judgement {
            Judgement::Perfect => self.perfect,
            Judgement::Good => self.good,
            Judgement::Miss => self.miss,
        }
    }
}

impl Default for JudgementColors {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a judged input or an expired note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Judgement {
    Perfect,
    Good,
    Miss,
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub good: u32,
    pub miss: u32,
    /// Reserved column of the plays table; the judge never produces it.
    pub bad: u32,
    pub score: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one judgement and adds its score weight.
    pub fn apply(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => {
                self.perfect += 1;
                self.score += PERFECT_SCORE;
            }
            Judgement::Good => {
                self.good += 1;
                self.score += GOOD_SCORE;
            }
            Judgement::Miss => self.miss += 1,
        }
    }

    /// Number of judged events.
    pub fn judged(&self) -> u32 {
        self.perfect + self.good + self.miss + self.bad
    }

    /// Percentage of perfect/good hits over every judged event (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.judged();
        if total == 0 {
            return 0.0;
        }
        (self.perfect + self.good) as f64 / total as f64 * 100.0
    }
}
