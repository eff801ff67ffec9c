//! Bridge from the synchronous session to the async database.

use crate::database::Database;
use crate::database::models::{DbError, PlayRecord};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("score storage unavailable: {0}")]
    Unavailable(String),
}

/// Where a finished run is written.
pub trait ScoreRecorder {
    /// Stores the run and returns its row id.
    fn record(&mut self, play: &PlayRecord) -> Result<i64, RecordError>;
}

/// Records runs into SQLite, blocking on the shared runtime.
pub struct DbRecorder {
    runtime: Arc<Runtime>,
    db: Database,
}

impl DbRecorder {
    pub fn new(runtime: Arc<Runtime>, db: Database) -> Self {
        Self { runtime, db }
    }
}

impl ScoreRecorder for DbRecorder {
    fn record(&mut self, play: &PlayRecord) -> Result<i64, RecordError> {
        let id = self.runtime.block_on(self.db.insert_play(play))?;
        Ok(id)
    }
}

/// Recorder for runs that must not be stored (autoplay).
#[derive(Debug, Default)]
pub struct DiscardRecorder;

impl ScoreRecorder for DiscardRecorder {
    fn record(&mut self, _play: &PlayRecord) -> Result<i64, RecordError> {
        Err(RecordError::Unavailable("recording disabled".to_string()))
    }
}
