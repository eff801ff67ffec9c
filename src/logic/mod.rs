//! Collaborators driving or serving a session: audio output and autoplay.

pub mod audio;
pub mod autoplay;
