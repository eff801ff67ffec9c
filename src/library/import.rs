//! Imports a zipped chart + track into the songs directory.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub const CHART_FILE: &str = "map.csv";
pub const AUDIO_FILE: &str = "audio.mp3";
pub const MAX_NAME_CHARS: usize = 60;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("song name is empty")]
    EmptyName,
    #[error("song name has no usable characters")]
    InvalidName,
    #[error("archive not found: {0:?}")]
    MissingArchive(PathBuf),
    #[error("not a .zip file: {0:?}")]
    NotZip(PathBuf),
    #[error("a song named '{0}' already exists")]
    AlreadyExists(String),
    #[error("invalid zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("the archive needs at least one .csv and one .mp3")]
    MissingFiles,
    #[error("unable to write the song files: {0}")]
    Io(#[from] io::Error),
}

/// Folder-safe version of a song name.
///
/// Keeps alphanumerics, spaces, `-` and `_`, trims, turns spaces into `_`
/// and cuts the result to [`MAX_NAME_CHARS`] characters.
pub fn sanitize_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim()
        .replace(' ', "_")
        .chars()
        .take(MAX_NAME_CHARS)
        .collect()
}

/// Extracts the first `.csv` and `.mp3` of `zip_path` into
/// `songs_dir/<sanitized name>/` and returns that folder.
pub fn import_song(zip_path: &Path, name: &str, songs_dir: &Path) -> Result<PathBuf, ImportError> {
    if name.trim().is_empty() {
        return Err(ImportError::EmptyName);
    }
    if !zip_path.is_file() {
        return Err(ImportError::MissingArchive(zip_path.to_path_buf()));
    }
    let is_zip = zip_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(ImportError::NotZip(zip_path.to_path_buf()));
    }

    let folder = sanitize_name(name);
    if folder.is_empty() {
        return Err(ImportError::InvalidName);
    }
    let target = songs_dir.join(&folder);
    if target.exists() {
        return Err(ImportError::AlreadyExists(folder));
    }

    let mut archive = ZipArchive::new(File::open(zip_path)?)?;
    let chart = find_entry(&mut archive, "csv")?;
    let audio = find_entry(&mut archive, "mp3")?;
    let (Some(chart), Some(audio)) = (chart, audio) else {
        return Err(ImportError::MissingFiles);
    };

    fs::create_dir_all(&target)?;
    let extracted = extract_entry(&mut archive, chart, &target.join(CHART_FILE))
        .and_then(|_| extract_entry(&mut archive, audio, &target.join(AUDIO_FILE)));
    if let Err(e) = extracted {
        log::error!("LIBRARY: Import of {:?} failed: {}", zip_path, e);
        if let Err(cleanup) = fs::remove_dir_all(&target) {
            log::warn!("LIBRARY: Could not remove {:?}: {}", target, cleanup);
        }
        return Err(e);
    }

    log::info!("LIBRARY: Imported {:?} as '{}'", zip_path, folder);
    Ok(target)
}

/// Index of the first file entry with the given extension, anywhere in the archive.
fn find_entry(archive: &mut ZipArchive<File>, extension: &str) -> Result<Option<usize>, ImportError> {
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        let matches = entry
            .enclosed_name()
            .as_deref()
            .and_then(|p| p.extension())
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn extract_entry(archive: &mut ZipArchive<File>, index: usize, dest: &Path) -> Result<(), ImportError> {
    let mut entry = archive.by_index(index)?;
    let mut out = File::create(dest)?;
    io::copy(&mut entry, &mut out)?;
    Ok(())
}
