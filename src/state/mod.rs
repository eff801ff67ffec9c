//! State management module.
//!
//! `GameSession` owns a running song from the first note to the results
//! screen. The front end (window or autoplay) only steps it and forwards
//! input.

pub mod game;

pub use game::{GameSession, SessionContext, SessionSignal, SessionState};
