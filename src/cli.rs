//! Command line parsing.

use crate::database::PlayUpdate;
use std::path::PathBuf;

pub const USAGE: &str = "usage:
  engrenada-hero play <song> [--player NAME] [--autoplay]
  engrenada-hero songs
  engrenada-hero import <zip> <name>
  engrenada-hero leaderboard <song> [--limit N]
  engrenada-hero latest [--limit N]
  engrenada-hero history <player>
  engrenada-hero players [rename <name> <new name> | delete <name>]
  engrenada-hero plays [show <id> | delete <id> | set-score <id> <score>]
  engrenada-hero plays edit <id> [--music NAME] [--score N] [--player-id N]
                 [--errors N] [--perfect N] [--good N] [--bad N] [--played-at TS]";

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play {
        song: String,
        player: Option<String>,
        autoplay: bool,
    },
    Songs,
    Import {
        zip: PathBuf,
        name: String,
    },
    Leaderboard {
        song: String,
        limit: i64,
    },
    Latest {
        limit: i64,
    },
    History {
        player: String,
    },
    Players,
    RenamePlayer {
        name: String,
        new_name: String,
    },
    DeletePlayer {
        name: String,
    },
    Plays,
    ShowPlay {
        id: i64,
    },
    EditPlay {
        id: i64,
        update: PlayUpdate,
    },
    SetScore {
        id: i64,
        score: i64,
    },
    DeletePlay {
        id: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("unexpected argument '{0}'")]
    Unexpected(String),
    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: &'static str, value: String },
}

/// Parses the arguments that follow the program name.
pub fn parse(args: &[String]) -> Result<Command, CliError> {
    let mut args = args.iter();
    let command = args.next().ok_or(CliError::MissingCommand)?;

    match command.as_str() {
        "play" => {
            let mut song = None;
            let mut player = None;
            let mut autoplay = false;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--autoplay" => autoplay = true,
                    "--player" => {
                        let name = args.next().ok_or(CliError::MissingArgument("NAME"))?;
                        player = Some(name.clone());
                    }
                    other if other.starts_with("--") => {
                        return Err(CliError::Unexpected(other.to_string()));
                    }
                    other if song.is_none() => song = Some(other.to_string()),
                    other => return Err(CliError::Unexpected(other.to_string())),
                }
            }
            Ok(Command::Play {
                song: song.ok_or(CliError::MissingArgument("song"))?,
                player,
                autoplay,
            })
        }
        "songs" => no_more(args, Command::Songs),
        "history" => {
            let player = args.next().ok_or(CliError::MissingArgument("player"))?;
            no_more(
                args,
                Command::History {
                    player: player.clone(),
                },
            )
        }
        "latest" => {
            let mut limit = DEFAULT_LEADERBOARD_LIMIT;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--limit" => limit = limit_value(args.next())?,
                    other => return Err(CliError::Unexpected(other.to_string())),
                }
            }
            Ok(Command::Latest { limit })
        }
        "players" => match args.next().map(String::as_str) {
            None => Ok(Command::Players),
            Some("rename") => {
                let name = args.next().ok_or(CliError::MissingArgument("name"))?;
                let new_name = args.next().ok_or(CliError::MissingArgument("new name"))?;
                no_more(
                    args,
                    Command::RenamePlayer {
                        name: name.clone(),
                        new_name: new_name.clone(),
                    },
                )
            }
            Some("delete") => {
                let name = args.next().ok_or(CliError::MissingArgument("name"))?;
                no_more(args, Command::DeletePlayer { name: name.clone() })
            }
            Some(other) => Err(CliError::Unexpected(other.to_string())),
        },
        "plays" => match args.next().map(String::as_str) {
            None => Ok(Command::Plays),
            Some("show") => {
                let id = id_value(args.next())?;
                no_more(args, Command::ShowPlay { id })
            }
            Some("delete") => {
                let id = id_value(args.next())?;
                no_more(args, Command::DeletePlay { id })
            }
            Some("set-score") => {
                let id = id_value(args.next())?;
                let score = number_value("score", args.next())?;
                no_more(args, Command::SetScore { id, score })
            }
            Some("edit") => {
                let id = id_value(args.next())?;
                let mut update = PlayUpdate::default();
                while let Some(flag) = args.next() {
                    let value = args.next();
                    match flag.as_str() {
                        "--music" => {
                            let name = value.ok_or(CliError::MissingArgument("NAME"))?;
                            update.music_name = Some(name.clone());
                        }
                        "--played-at" => {
                            let ts = value.ok_or(CliError::MissingArgument("TS"))?;
                            update.played_at = Some(ts.clone());
                        }
                        "--score" => update.score = Some(number_value("--score", value)?),
                        "--player-id" => {
                            update.player_id = Some(number_value("--player-id", value)?)
                        }
                        "--errors" => update.errors = Some(number_value("--errors", value)?),
                        "--perfect" => {
                            update.perfect_hits = Some(number_value("--perfect", value)?)
                        }
                        "--good" => update.good_hits = Some(number_value("--good", value)?),
                        "--bad" => update.bad_hits = Some(number_value("--bad", value)?),
                        other => return Err(CliError::Unexpected(other.to_string())),
                    }
                }
                Ok(Command::EditPlay { id, update })
            }
            Some(other) => Err(CliError::Unexpected(other.to_string())),
        },
        "import" => {
            let zip = args.next().ok_or(CliError::MissingArgument("zip"))?;
            let name = args.next().ok_or(CliError::MissingArgument("name"))?;
            no_more(
                args,
                Command::Import {
                    zip: PathBuf::from(zip),
                    name: name.clone(),
                },
            )
        }
        "leaderboard" => {
            let mut song = None;
            let mut limit = DEFAULT_LEADERBOARD_LIMIT;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--limit" => limit = limit_value(args.next())?,
                    other if song.is_none() && !other.starts_with("--") => {
                        song = Some(other.to_string())
                    }
                    other => return Err(CliError::Unexpected(other.to_string())),
                }
            }
            Ok(Command::Leaderboard {
                song: song.ok_or(CliError::MissingArgument("song"))?,
                limit,
            })
        }
        other => Err(CliError::UnknownCommand(other.to_string())),
    }
}

/// Parses an integer argument. Range checks are left to the database layer.
fn number_value(name: &'static str, value: Option<&String>) -> Result<i64, CliError> {
    let value = value.ok_or(CliError::MissingArgument(name))?;
    value.parse::<i64>().map_err(|_| CliError::InvalidValue {
        flag: name,
        value: value.clone(),
    })
}

fn id_value(value: Option<&String>) -> Result<i64, CliError> {
    number_value("id", value)
}

fn limit_value(value: Option<&String>) -> Result<i64, CliError> {
    let value = value.ok_or(CliError::MissingArgument("N"))?;
    value
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| CliError::InvalidValue {
            flag: "--limit",
            value: value.clone(),
        })
}

fn no_more<'a>(
    mut rest: impl Iterator<Item = &'a String>,
    command: Command,
) -> Result<Command, CliError> {
    match rest.next() {
        Some(extra) => Err(CliError::Unexpected(extra.clone())),
        None => Ok(command),
    }
}
