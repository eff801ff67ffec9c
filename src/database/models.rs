//! Data structures mirroring the SQLite tables.

use crate::models::stats::HitStats;
use sqlx::FromRow;

/// Format of `plays.played_at` (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Leaderboard name used when the player row no longer exists.
pub const UNKNOWN_PLAYER_PREFIX: &str = "Jogador #";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("unable to prepare the database directory: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        DbError::Invalid { field, reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Play {
    pub id: i64,
    pub played_at: String,
    pub music_name: String,
    pub score: i64,
    pub player_id: i64,
    pub errors: i64,
    pub perfect_hits: i64,
    pub good_hits: i64,
    pub bad_hits: i64,
}

/// A finished run about to be inserted into `plays`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub played_at: String,
    pub music_name: String,
    pub score: i64,
    pub player_id: i64,
    pub errors: i64,
    pub perfect_hits: i64,
    pub good_hits: i64,
    pub bad_hits: i64,
}

impl PlayRecord {
    /// Builds the record of a run that ends now.
    pub fn from_stats(player_id: i64, music_name: &str, stats: &HitStats) -> Self {
        Self {
            played_at: now_timestamp(),
            music_name: music_name.to_string(),
            score: i64::from(stats.score),
            player_id,
            errors: i64::from(stats.miss),
            perfect_hits: i64::from(stats.perfect),
            good_hits: i64::from(stats.good),
            bad_hits: i64::from(stats.bad),
        }
    }

    /// Checks the row constraints and returns a trimmed copy.
    pub fn validated(&self) -> Result<Self, DbError> {
        Ok(Self {
            played_at: non_empty("played_at", &self.played_at)?,
            music_name: non_empty("music_name", &self.music_name)?,
            score: at_least("score", self.score, 0)?,
            player_id: at_least("player_id", self.player_id, 1)?,
            errors: at_least("errors", self.errors, 0)?,
            perfect_hits: at_least("perfect_hits", self.perfect_hits, 0)?,
            good_hits: at_least("good_hits", self.good_hits, 0)?,
            bad_hits: at_least("bad_hits", self.bad_hits, 0)?,
        })
    }
}

/// Partial update of a play; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayUpdate {
    pub played_at: Option<String>,
    pub music_name: Option<String>,
    pub score: Option<i64>,
    pub player_id: Option<i64>,
    pub errors: Option<i64>,
    pub perfect_hits: Option<i64>,
    pub good_hits: Option<i64>,
    pub bad_hits: Option<i64>,
}

impl PlayUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validated(&self) -> Result<Self, DbError> {
        if self.is_empty() {
            return Err(DbError::invalid("update", "nothing to update"));
        }
        Ok(Self {
            played_at: optional_text("played_at", self.played_at.as_deref())?,
            music_name: optional_text("music_name", self.music_name.as_deref())?,
            score: optional_count("score", self.score, 0)?,
            player_id: optional_count("player_id", self.player_id, 1)?,
            errors: optional_count("errors", self.errors, 0)?,
            perfect_hits: optional_count("perfect_hits", self.perfect_hits, 0)?,
            good_hits: optional_count("good_hits", self.good_hits, 0)?,
            bad_hits: optional_count("bad_hits", self.bad_hits, 0)?,
        })
    }
}

/// A play joined with its player's name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LeaderboardEntry {
    #[sqlx(flatten)]
    pub play: Play,
    pub player_name: String,
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<String, DbError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn at_least(field: &'static str, value: i64, min: i64) -> Result<i64, DbError> {
    if value < min {
        let reason = if min == 0 {
            "must not be negative"
        } else {
            "must be at least 1"
        };
        return Err(DbError::invalid(field, reason));
    }
    Ok(value)
}

fn optional_text(field: &'static str, value: Option<&str>) -> Result<Option<String>, DbError> {
    value.map(|v| non_empty(field, v)).transpose()
}

fn optional_count(field: &'static str, value: Option<i64>, min: i64) -> Result<Option<i64>, DbError> {
    value.map(|v| at_least(field, v, min)).transpose()
}
