//! Scripted player used by `play --autoplay`.
//!
//! Strikes the pads of the leader note once it is close to the hit line,
//! going through the same press/resolve path as a human player.

use crate::core::input::actions::{DrumKey, pads_for};
use crate::state::game::{GameSession, SessionSignal, SessionState};

#[derive(Debug, Default)]
pub struct Autoplay {
    held: Vec<DrumKey>,
}

impl Autoplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the strokes for the next frame.
    pub fn step(&mut self, session: &mut GameSession) {
        for key in self.held.drain(..) {
            session.release(key);
        }

        let Some(leader) = session.leader() else {
            return;
        };
        let window = session.hit_window();
        if window.distance(leader.position) > window.perfect_radius * 0.5 {
            return;
        }

        let pads = pads_for(leader.kind);
        for &key in pads {
            session.press(key);
        }
        self.held.extend_from_slice(pads);
    }

    /// Plays a whole session at a fixed frame rate and leaves the results screen.
    pub fn run(&mut self, session: &mut GameSession, fps: f64) {
        let dt = 1.0 / fps.max(1.0);
        loop {
            if session.state() == SessionState::ShowResults {
                session.confirm();
            }
            self.step(session);
            if session.update(dt) == SessionSignal::Exit {
                break;
            }
        }
    }
}
