//! Song folders on disk: discovery and zip import.

pub mod import;
pub mod scanner;

pub use import::{ImportError, import_song, sanitize_name};
pub use scanner::{Song, find_song, scan_songs};
