//! Raw sqlx query helpers for the scores database.
//!
//! Every write validates its input first and reports violations as
//! `DbError::Invalid`; nothing reaches SQLite unchecked.

use crate::database::models::{
    DbError, LeaderboardEntry, Play, PlayRecord, PlayUpdate, Player, UNKNOWN_PLAYER_PREFIX,
    at_least, non_empty,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const PLAY_COLUMNS: &str =
    "id, played_at, music_name, score, player_id, errors, perfect_hits, good_hits, bad_hits";

const LEADERBOARD_SELECT: &str = "SELECT plays.id, plays.played_at, plays.music_name, plays.score, \
     plays.player_id, plays.errors, plays.perfect_hits, plays.good_hits, plays.bad_hits, \
     COALESCE(player.name, ?1 || plays.player_id) AS player_name \
     FROM plays LEFT JOIN player ON player.id = plays.player_id";

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

pub async fn create_player(pool: &SqlitePool, name: &str) -> Result<i64, DbError> {
    let name = non_empty("name", name)?;
    let result = sqlx::query("INSERT INTO player (name) VALUES (?1)")
        .bind(&name)
        .execute(pool)
        .await?;
    log::info!("DB: Created player '{}'", name);
    Ok(result.last_insert_rowid())
}

pub async fn get_player(pool: &SqlitePool, id: i64) -> Result<Option<Player>, DbError> {
    let player = sqlx::query_as::<_, Player>("SELECT id, name FROM player WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(player)
}

/// Exact (trimmed) name lookup.
pub async fn get_player_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Player>, DbError> {
    let name = non_empty("name", name)?;
    let player = sqlx::query_as::<_, Player>("SELECT id, name FROM player WHERE name = ?1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(player)
}

pub async fn all_players(pool: &SqlitePool) -> Result<Vec<Player>, DbError> {
    let players = sqlx::query_as::<_, Player>("SELECT id, name FROM player ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(players)
}

/// Returns the number of rows changed (0 when the id does not exist).
pub async fn rename_player(pool: &SqlitePool, id: i64, name: &str) -> Result<u64, DbError> {
    let name = non_empty("name", name)?;
    let result = sqlx::query("UPDATE player SET name = ?1 WHERE id = ?2")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes the player row. Their plays are kept.
pub async fn delete_player(pool: &SqlitePool, id: i64) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM player WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn ensure_player(pool: &SqlitePool, name: &str) -> Result<Player, DbError> {
    if let Some(player) = get_player_by_name(pool, name).await? {
        return Ok(player);
    }
    let id = create_player(pool, name).await?;
    Ok(Player {
        id,
        name: non_empty("name", name)?,
    })
}

// ---------------------------------------------------------------------------
// Plays
// ---------------------------------------------------------------------------

pub async fn insert_play(pool: &SqlitePool, play: &PlayRecord) -> Result<i64, DbError> {
    let play = play.validated()?;
    let result = sqlx::query(
        "INSERT INTO plays (played_at, music_name, score, player_id, errors, perfect_hits, good_hits, bad_hits)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(&play.played_at)
    .bind(&play.music_name)
    .bind(play.score)
    .bind(play.player_id)
    .bind(play.errors)
    .bind(play.perfect_hits)
    .bind(play.good_hits)
    .bind(play.bad_hits)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_play(pool: &SqlitePool, id: i64) -> Result<Option<Play>, DbError> {
    let play = sqlx::query_as::<_, Play>(&format!("SELECT {PLAY_COLUMNS} FROM plays WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(play)
}

pub async fn all_plays(pool: &SqlitePool) -> Result<Vec<Play>, DbError> {
    let plays = sqlx::query_as::<_, Play>(&format!("SELECT {PLAY_COLUMNS} FROM plays ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(plays)
}

/// Applies the fields set in `update`. Returns the number of rows changed.
pub async fn update_play(pool: &SqlitePool, id: i64, update: &PlayUpdate) -> Result<u64, DbError> {
    let update = update.validated()?;

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE plays SET ");
    let mut set = builder.separated(", ");
    if let Some(value) = update.played_at {
        set.push("played_at = ").push_bind_unseparated(value);
    }
    if let Some(value) = update.music_name {
        set.push("music_name = ").push_bind_unseparated(value);
    }
    for (column, value) in [
        ("score", update.score),
        ("player_id", update.player_id),
        ("errors", update.errors),
        ("perfect_hits", update.perfect_hits),
        ("good_hits", update.good_hits),
        ("bad_hits", update.bad_hits),
    ] {
        if let Some(value) = value {
            set.push(format!("{column} = ")).push_bind_unseparated(value);
        }
    }
    builder.push(" WHERE id = ").push_bind(id);

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn update_play_score(pool: &SqlitePool, id: i64, score: i64) -> Result<u64, DbError> {
    let update = PlayUpdate {
        score: Some(score),
        ..PlayUpdate::default()
    };
    update_play(pool, id, &update).await
}

pub async fn delete_play(pool: &SqlitePool, id: i64) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM plays WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Plays of one player, most recent first.
pub async fn plays_for_player(pool: &SqlitePool, player_id: i64) -> Result<Vec<Play>, DbError> {
    let player_id = at_least("player_id", player_id, 1)?;
    let plays = sqlx::query_as::<_, Play>(&format!(
        "SELECT {PLAY_COLUMNS} FROM plays WHERE player_id = ?1 ORDER BY played_at DESC, id DESC"
    ))
    .bind(player_id)
    .fetch_all(pool)
    .await?;
    Ok(plays)
}

pub async fn latest_plays(pool: &SqlitePool, limit: i64) -> Result<Vec<Play>, DbError> {
    let limit = at_least("limit", limit, 1)?;
    let plays = sqlx::query_as::<_, Play>(&format!(
        "SELECT {PLAY_COLUMNS} FROM plays ORDER BY played_at DESC, id DESC LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(plays)
}

/// Best plays of a song: highest score first, earlier play wins ties.
pub async fn leaderboard_for_music(
    pool: &SqlitePool,
    music_name: &str,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, DbError> {
    let music_name = non_empty("music_name", music_name)?;
    let limit = at_least("limit", limit, 1)?;
    let entries = sqlx::query_as::<_, LeaderboardEntry>(&format!(
        "{LEADERBOARD_SELECT} WHERE plays.music_name = ?2 \
         ORDER BY plays.score DESC, plays.played_at ASC, plays.id ASC LIMIT ?3"
    ))
    .bind(UNKNOWN_PLAYER_PREFIX)
    .bind(music_name)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn best_for_player_and_music(
    pool: &SqlitePool,
    player_id: i64,
    music_name: &str,
) -> Result<Option<LeaderboardEntry>, DbError> {
    let player_id = at_least("player_id", player_id, 1)?;
    let music_name = non_empty("music_name", music_name)?;
    let entry = sqlx::query_as::<_, LeaderboardEntry>(&format!(
        "{LEADERBOARD_SELECT} WHERE plays.music_name = ?2 AND plays.player_id = ?3 \
         ORDER BY plays.score DESC, plays.played_at ASC, plays.id ASC LIMIT 1"
    ))
    .bind(UNKNOWN_PLAYER_PREFIX)
    .bind(music_name)
    .bind(player_id)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn record(player_id: i64, music: &str, score: i64, played_at: &str) -> PlayRecord {
        PlayRecord {
            played_at: played_at.to_string(),
            music_name: music.to_string(),
            score,
            player_id,
            errors: 1,
            perfect_hits: 2,
            good_hits: 0,
            bad_hits: 0,
        }
    }

    #[tokio::test]
    async fn player_crud() {
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool();

        let id = create_player(pool, "  Ana  ").await.unwrap();
        let player = get_player(pool, id).await.unwrap().unwrap();
        assert_eq!(player.name, "Ana");
        assert_eq!(get_player_by_name(pool, "Ana ").await.unwrap(), Some(player.clone()));

        assert_eq!(rename_player(pool, id, "Bia").await.unwrap(), 1);
        assert_eq!(rename_player(pool, 999, "Caio").await.unwrap(), 0);
        assert!(get_player_by_name(pool, "Ana").await.unwrap().is_none());

        let again = ensure_player(pool, "Bia").await.unwrap();
        assert_eq!(again.id, id);
        let other = ensure_player(pool, "Duda").await.unwrap();
        assert_ne!(other.id, id);
        assert_eq!(all_players(pool).await.unwrap().len(), 2);

        assert_eq!(delete_player(pool, id).await.unwrap(), 1);
        assert!(get_player(pool, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_names_are_rejected() {
        let db = Database::in_memory().await.unwrap();
        assert!(matches!(
            create_player(db.pool(), "   ").await,
            Err(DbError::Invalid { field: "name", .. })
        ));
        assert!(get_player_by_name(db.pool(), "").await.is_err());
        assert!(db.all_players().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_player_name_fails() {
        let db = Database::in_memory().await.unwrap();
        db.create_player("Ana").await.unwrap();
        assert!(matches!(db.create_player("Ana").await, Err(DbError::Sqlx(_))));
    }

    #[tokio::test]
    async fn play_crud() {
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool();

        let id = insert_play(pool, &record(1, " Samba ", 300, "2024-05-01 20:00:00"))
            .await
            .unwrap();
        let play = get_play(pool, id).await.unwrap().unwrap();
        assert_eq!(play.music_name, "Samba");
        assert_eq!(play.score, 300);
        assert_eq!(play.errors, 1);

        assert_eq!(update_play_score(pool, id, 450).await.unwrap(), 1);
        let update = PlayUpdate {
            good_hits: Some(3),
            music_name: Some("Frevo".to_string()),
            ..PlayUpdate::default()
        };
        assert_eq!(update_play(pool, id, &update).await.unwrap(), 1);
        let play = get_play(pool, id).await.unwrap().unwrap();
        assert_eq!(play.score, 450);
        assert_eq!(play.good_hits, 3);
        assert_eq!(play.music_name, "Frevo");
        assert_eq!(play.perfect_hits, 2);

        assert!(update_play_score(pool, id, -1).await.is_err());
        assert!(update_play(pool, id, &PlayUpdate::default()).await.is_err());

        assert_eq!(all_plays(pool).await.unwrap().len(), 1);
        assert_eq!(delete_play(pool, id).await.unwrap(), 1);
        assert!(get_play(pool, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_play_is_not_inserted() {
        let db = Database::in_memory().await.unwrap();
        let mut bad = record(0, "Samba", 10, "2024-05-01 20:00:00");
        assert!(db.insert_play(&bad).await.is_err());
        bad.player_id = 1;
        bad.score = -10;
        assert!(db.insert_play(&bad).await.is_err());
        assert!(db.all_plays().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaderboard_order_and_fallback_name() {
        let db = Database::in_memory().await.unwrap();
        let ana = db.create_player("Ana").await.unwrap();
        let bia = db.create_player("Bia").await.unwrap();

        db.insert_play(&record(ana, "Samba", 300, "2024-05-01 20:00:00")).await.unwrap();
        db.insert_play(&record(bia, "Samba", 500, "2024-05-02 20:00:00")).await.unwrap();
        db.insert_play(&record(ana, "Samba", 500, "2024-05-03 20:00:00")).await.unwrap();
        db.insert_play(&record(42, "Samba", 100, "2024-05-04 20:00:00")).await.unwrap();
        db.insert_play(&record(ana, "Frevo", 900, "2024-05-05 20:00:00")).await.unwrap();

        let board = db.leaderboard_for_music("Samba", 10).await.unwrap();
        let rows: Vec<(&str, i64)> = board
            .iter()
            .map(|e| (e.player_name.as_str(), e.play.score))
            .collect();
        assert_eq!(
            rows,
            vec![("Bia", 500), ("Ana", 500), ("Ana", 300), ("Jogador #42", 100)]
        );

        assert_eq!(db.leaderboard_for_music("Samba", 2).await.unwrap().len(), 2);
        assert!(db.leaderboard_for_music("Samba", 0).await.is_err());

        let best = db.best_for_player_and_music(ana, "Samba").await.unwrap().unwrap();
        assert_eq!(best.play.score, 500);
        assert_eq!(best.play.played_at, "2024-05-03 20:00:00");
        assert!(db.best_for_player_and_music(bia, "Frevo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_queries() {
        let db = Database::in_memory().await.unwrap();
        db.insert_play(&record(1, "Samba", 100, "2024-05-01 20:00:00")).await.unwrap();
        db.insert_play(&record(2, "Samba", 200, "2024-05-03 20:00:00")).await.unwrap();
        db.insert_play(&record(1, "Frevo", 300, "2024-05-02 20:00:00")).await.unwrap();

        let mine = db.plays_for_player(1).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].music_name, "Frevo");

        let latest = db.latest_plays(2).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].score, 200);
        assert_eq!(latest[1].score, 300);

        assert!(db.plays_for_player(0).await.is_err());
    }
}
