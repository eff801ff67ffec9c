pub mod connection;
pub mod models;
pub mod query;
pub mod recorder;

pub use connection::Database;
pub use models::{DbError, LeaderboardEntry, Play, PlayRecord, PlayUpdate, Player};
pub use recorder::{DbRecorder, DiscardRecorder, RecordError, ScoreRecorder};
