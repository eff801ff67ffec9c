//! Application entry point and command dispatch.

mod app;
mod cli;
mod core;
mod database;
mod library;
mod logic;
mod models;
mod render;
mod shared;
mod state;

use crate::app::App;
use crate::cli::{Command, USAGE};
use crate::core::input::InputManager;
use crate::core::input::bindings::KeyBindings;
use crate::database::models::UNKNOWN_PLAYER_PREFIX;
use crate::database::{Database, DbError, DbRecorder, DiscardRecorder, Play, Player};
use crate::library::{ImportError, find_song, import_song, scan_songs};
use crate::logic::audio::{RodioPlayer, SilentPlayer};
use crate::logic::autoplay::Autoplay;
use crate::models::engine::load_beatmap;
use crate::models::settings::{SETTINGS_FILE, Settings};
use crate::models::stats::HitStats;
use crate::state::{GameSession, SessionContext};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Frame rate of headless autoplay runs.
const AUTOPLAY_FPS: f64 = 120.0;

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("unable to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("window error: {0}")]
    Window(#[from] winit::error::EventLoopError),
    #[error("song '{0}' not found (run `songs` to list them)")]
    SongNotFound(String),
    #[error("player '{0}' not found (run `players` to list them)")]
    PlayerNotFound(String),
    #[error("play #{0} not found")]
    PlayNotFound(i64),
}

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        // SAFETY: no other thread exists yet.
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    log::info!("MAIN: Booting Engrenada Hero...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match cli::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let settings_path = Path::new(SETTINGS_FILE);
    let settings = Settings::load(settings_path);
    if !settings_path.exists()
        && let Err(e) = settings.save(settings_path)
    {
        log::warn!("SETTINGS: Could not write defaults: {}", e);
    }

    if let Err(e) = run(command, &settings) {
        log::error!("MAIN: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command, settings: &Settings) -> Result<(), MainError> {
    match command {
        Command::Songs => {
            for song in scan_songs(&settings.songs_dir) {
                println!("{}", song.title);
            }
            Ok(())
        }
        Command::Import { zip, name } => {
            let target = import_song(&zip, &name, &settings.songs_dir)?;
            println!("Imported into {}", target.display());
            Ok(())
        }
        Command::Players => {
            let (rt, db) = open_database(settings)?;
            for player in rt.block_on(db.all_players())? {
                println!("{:>4}  {}", player.id, player.name);
            }
            Ok(())
        }
        Command::Leaderboard { song, limit } => {
            let (rt, db) = open_database(settings)?;
            let entries = rt.block_on(db.leaderboard_for_music(&song, limit))?;
            if entries.is_empty() {
                println!("No plays for '{}' yet.", song);
            }
            for (rank, entry) in entries.iter().enumerate() {
                println!(
                    "{:>2}. {:<20} {:>7}  {}",
                    rank + 1,
                    entry.player_name,
                    entry.play.score,
                    entry.play.played_at
                );
            }
            Ok(())
        }
        Command::Latest { limit } => {
            let (rt, db) = open_database(settings)?;
            for play in rt.block_on(db.latest_plays(limit))? {
                let name = rt.block_on(player_label(&db, play.player_id))?;
                print_play(&play, &name);
            }
            Ok(())
        }
        Command::History { player } => {
            let (rt, db) = open_database(settings)?;
            let player = rt.block_on(find_player(&db, &player))?;
            let plays = rt.block_on(db.plays_for_player(player.id))?;
            if plays.is_empty() {
                println!("{} has no plays yet.", player.name);
            }
            for play in &plays {
                print_play(play, &player.name);
            }
            Ok(())
        }
        Command::RenamePlayer { name, new_name } => {
            let (rt, db) = open_database(settings)?;
            let player = rt.block_on(find_player(&db, &name))?;
            rt.block_on(db.rename_player(player.id, &new_name))?;
            println!("Renamed {} to {}", player.name, new_name.trim());
            Ok(())
        }
        Command::DeletePlayer { name } => {
            let (rt, db) = open_database(settings)?;
            let player = rt.block_on(find_player(&db, &name))?;
            rt.block_on(db.delete_player(player.id))?;
            println!("Deleted player {}", player.name);
            Ok(())
        }
        Command::Plays => {
            let (rt, db) = open_database(settings)?;
            for play in rt.block_on(db.all_plays())? {
                let name = rt.block_on(player_label(&db, play.player_id))?;
                print_play(&play, &name);
            }
            Ok(())
        }
        Command::ShowPlay { id } => {
            let (rt, db) = open_database(settings)?;
            let play = rt
                .block_on(db.get_play(id))?
                .ok_or(MainError::PlayNotFound(id))?;
            let name = rt.block_on(player_label(&db, play.player_id))?;
            print_play(&play, &name);
            println!(
                "      perfect {} | good {} | bad {} | miss {}",
                play.perfect_hits, play.good_hits, play.bad_hits, play.errors
            );
            Ok(())
        }
        Command::EditPlay { id, update } => {
            let (rt, db) = open_database(settings)?;
            if rt.block_on(db.update_play(id, &update))? == 0 {
                return Err(MainError::PlayNotFound(id));
            }
            println!("Updated play #{}", id);
            Ok(())
        }
        Command::SetScore { id, score } => {
            let (rt, db) = open_database(settings)?;
            if rt.block_on(db.update_play_score(id, score))? == 0 {
                return Err(MainError::PlayNotFound(id));
            }
            println!("Play #{} now scores {}", id, score);
            Ok(())
        }
        Command::DeletePlay { id } => {
            let (rt, db) = open_database(settings)?;
            if rt.block_on(db.delete_play(id))? == 0 {
                return Err(MainError::PlayNotFound(id));
            }
            println!("Deleted play #{}", id);
            Ok(())
        }
        Command::Play {
            song,
            player,
            autoplay,
        } => play(settings, &song, player, autoplay),
    }
}

async fn find_player(db: &Database, name: &str) -> Result<Player, MainError> {
    db.get_player_by_name(name)
        .await?
        .ok_or_else(|| MainError::PlayerNotFound(name.to_string()))
}

/// Player name for a play row, with the same fallback as the leaderboard.
async fn player_label(db: &Database, player_id: i64) -> Result<String, MainError> {
    Ok(match db.get_player(player_id).await? {
        Some(player) => player.name,
        None => format!("{}{}", UNKNOWN_PLAYER_PREFIX, player_id),
    })
}

fn print_play(play: &Play, player_name: &str) {
    println!(
        "#{:<4} {}  {:<20} {:<20} {:>7}",
        play.id, play.played_at, play.music_name, player_name, play.score
    );
}

fn open_database(settings: &Settings) -> Result<(Arc<Runtime>, Database), MainError> {
    let rt = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?,
    );
    let db = rt.block_on(Database::new(&settings.database_path))?;
    Ok((rt, db))
}

fn play(
    settings: &Settings,
    title: &str,
    player_name: Option<String>,
    autoplay: bool,
) -> Result<(), MainError> {
    let song = find_song(&settings.songs_dir, title)
        .ok_or_else(|| MainError::SongNotFound(title.to_string()))?;
    let notes = load_beatmap(&song.chart_path);

    if autoplay {
        let context = SessionContext {
            music_name: song.title.clone(),
            player: None,
            audio: Box::new(SilentPlayer),
            recorder: Box::new(DiscardRecorder),
        };
        let mut session = GameSession::new(notes, &settings.gameplay, context);
        Autoplay::new().run(&mut session, AUTOPLAY_FPS);
        print_summary(&song.title, session.stats());
        return Ok(());
    }

    let (rt, db) = open_database(settings)?;
    let player = match player_name.or_else(|| settings.player_name.clone()) {
        Some(name) => Some(rt.block_on(db.ensure_player(&name))?),
        None => {
            log::warn!("MAIN: No player given, the run will not be recorded");
            None
        }
    };

    let audio = RodioPlayer::new(
        &song.audio_path,
        &settings.sounds_dir,
        settings.gameplay.master_volume,
    );
    let context = SessionContext {
        music_name: song.title.clone(),
        player: player.clone(),
        audio: Box::new(audio),
        recorder: Box::new(DbRecorder::new(rt.clone(), db.clone())),
    };
    let session = GameSession::new(notes, &settings.gameplay, context);
    let input = InputManager::new(KeyBindings::from_settings(&settings.keybinds));

    let stats = App::new(session, input, &song.title).run()?;
    print_summary(&song.title, &stats);

    if let Some(player) = player
        && let Some(best) = rt.block_on(db.best_for_player_and_music(player.id, &song.title))?
    {
        println!(
            "Best for {}: {} ({})",
            player.name, best.play.score, best.play.played_at
        );
    }
    Ok(())
}

fn print_summary(title: &str, stats: &HitStats) {
    println!(
        "{}: score {} | perfect {} | good {} | miss {} | hit rate {:.1}%",
        title,
        stats.score,
        stats.perfect,
        stats.good,
        stats.miss,
        stats.hit_rate()
    );
}
