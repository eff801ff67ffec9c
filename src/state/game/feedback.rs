//! Cosmetic feedback: the judgement flash and the repique cue light.

use crate::models::stats::{Judgement, JudgementColors};

pub const FLASH_SECONDS: f64 = 0.25;
pub const REPIQUE_SECONDS: f64 = 0.3;

/// State of the cue light drawn next to the hit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repique {
    #[default]
    Neutral,
    Perfect,
    Good,
    Error,
}

impl From<Judgement> for Repique {
    fn from(judgement: Judgement) -> Self {
        match judgement {
            Judgement::Perfect => Repique::Perfect,
            Judgement::Good => Repique::Good,
            Judgement::Miss => Repique::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub color: [f32; 4],
    pub remaining: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Feedback {
    colors: JudgementColors,
    flash: Option<Flash>,
    repique: Repique,
    repique_remaining: f64,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&mut self, judgement: Judgement) {
        self.flash = Some(Flash {
            color: self.colors.for_judgement(judgement),
            remaining: FLASH_SECONDS,
        });
        self.repique = judgement.into();
        self.repique_remaining = REPIQUE_SECONDS;
    }

    pub fn update(&mut self, dt: f64) {
        if let Some(flash) = self.flash.as_mut() {
            flash.remaining -= dt;
            if flash.remaining <= 0.0 {
                self.flash = None;
            }
        }

        if self.repique != Repique::Neutral {
            self.repique_remaining -= dt;
            if self.repique_remaining <= 0.0 {
                self.repique = Repique::Neutral;
                self.repique_remaining = 0.0;
            }
        }
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    /// Flash strength in `0.0..=1.0`, decaying linearly.
    pub fn flash_intensity(&self) -> f64 {
        self.flash
            .map(|f| (f.remaining / FLASH_SECONDS).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn repique(&self) -> Repique {
        self.repique
    }
}
