//! One-shot deferred event, ticked by the frame loop.

#[derive(Debug, Clone, Default)]
pub struct DeferredTimer {
    remaining: Option<f64>,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer; it fires once `delay` seconds have been ticked.
    pub fn schedule(&mut self, delay: f64) {
        self.remaining = Some(delay.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Returns `true` on the tick where the delay runs out.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}
