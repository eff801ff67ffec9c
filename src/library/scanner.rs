//! Filesystem scanner for the songs directory.
//!
//! A song is a sub-folder holding exactly one `.csv` chart and one `.mp3`
//! track. The folder name is the song title and the key used for scores.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub chart_path: PathBuf,
    pub audio_path: PathBuf,
}

/// Lists the playable songs under `songs_dir`, sorted by title.
pub fn scan_songs(songs_dir: &Path) -> Vec<Song> {
    let entries = match fs::read_dir(songs_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("LIBRARY: Cannot read {:?}: {}", songs_dir, e);
            return Vec::new();
        }
    };

    let mut songs: Vec<Song> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter_map(|folder| load_song(&folder))
        .collect();

    songs.sort_by(|a, b| a.title.cmp(&b.title));
    log::info!("LIBRARY: {} songs found in {:?}", songs.len(), songs_dir);
    songs
}

/// Looks a song up by its title.
pub fn find_song(songs_dir: &Path, title: &str) -> Option<Song> {
    scan_songs(songs_dir).into_iter().find(|s| s.title == title)
}

fn load_song(folder: &Path) -> Option<Song> {
    let title = folder.file_name()?.to_str()?.to_string();
    let csv = collect_with_extension(folder, "csv");
    let mp3 = collect_with_extension(folder, "mp3");

    match (csv.as_slice(), mp3.as_slice()) {
        ([chart], [audio]) => Some(Song {
            title,
            chart_path: chart.clone(),
            audio_path: audio.clone(),
        }),
        _ => {
            log::info!(
                "LIBRARY: Skipping {:?} ({} csv, {} mp3)",
                folder,
                csv.len(),
                mp3.len()
            );
            None
        }
    }
}

fn collect_with_extension(folder: &Path, extension: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(folder) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect()
}
