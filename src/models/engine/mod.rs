pub mod beatmap;
pub mod constants;
pub mod hit_window;
pub mod note;

pub use beatmap::{load_beatmap, parse_beatmap};
pub use constants::*;
pub use hit_window::{HitWindow, Verdict};
pub use note::{Note, NoteKind, NoteState};
