//! Beatmap loading from the tabular `.csv` note charts.
//!
//! A chart has a header row naming a time column and a note column. Loading
//! is fail-soft: a bad row is skipped or patched, and an unreadable file
//! yields an empty chart.

use super::note::{Note, NoteKind};
use std::fs;
use std::path::Path;

const TIME_HEADERS: [&str; 4] = ["time", "tempo", "timestamp", "seconds"];
const NOTE_HEADERS: [&str; 5] = ["note", "type", "note_type", "nota", "kind"];

#[derive(Debug, thiserror::Error)]
enum BeatmapError {
    #[error("unable to read chart: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart has no header row")]
    MissingHeader,
}

/// Raw chart row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatmapEntry {
    pub time: f64,
    pub code: char,
}

/// Loads a chart and returns its notes sorted by time.
///
/// Never fails: errors are logged and an empty chart is returned.
pub fn load_beatmap(path: &Path) -> Vec<Note> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let notes = parse_beatmap(&content);
            log::info!("BEATMAP: Loaded {} notes from {:?}", notes.len(), path);
            notes
        }
        Err(e) => {
            log::error!("BEATMAP: Failed to load {:?}: {}", path, BeatmapError::from(e));
            Vec::new()
        }
    }
}

/// Parses chart text into notes. Same policy as [`load_beatmap`].
pub fn parse_beatmap(content: &str) -> Vec<Note> {
    match parse_entries(content) {
        Ok(entries) => notes_from_entries(&entries),
        Err(e) => {
            log::error!("BEATMAP: {}", e);
            Vec::new()
        }
    }
}

fn notes_from_entries(entries: &[BeatmapEntry]) -> Vec<Note> {
    let mut notes: Vec<Note> = entries
        .iter()
        .map(|entry| {
            let kind = NoteKind::from_code(entry.code).unwrap_or_else(|| {
                log::warn!(
                    "BEATMAP: Unknown note code {:?} at {:.3}s, using {}",
                    entry.code,
                    entry.time,
                    NoteKind::DEFAULT
                );
                NoteKind::DEFAULT
            });
            Note::new(entry.time, kind)
        })
        .collect();

    notes.sort_by(|a, b| a.spawn_time.total_cmp(&b.spawn_time));
    notes
}

fn parse_entries(content: &str) -> Result<Vec<BeatmapEntry>, BeatmapError> {
    let mut lines = content
        .lines()
        .map(|l| l.trim_start_matches('\u{feff}').trim())
        .filter(|l| !l.is_empty());

    let header = lines.next().ok_or(BeatmapError::MissingHeader)?;
    let delimiter = if header.contains(';') && !header.contains(',') {
        ';'
    } else {
        ','
    };

    let columns: Vec<String> = header
        .split(delimiter)
        .map(|c| c.trim().trim_matches('"').to_ascii_lowercase())
        .collect();
    let find = |names: &[&str]| columns.iter().position(|c| names.contains(&c.as_str()));
    let (time_col, note_col) = match (find(&TIME_HEADERS[..]), find(&NOTE_HEADERS[..])) {
        (Some(t), Some(n)) => (t, n),
        _ => {
            log::warn!(
                "BEATMAP: Header {:?} does not name time/note columns, using the first two",
                header
            );
            (0, 1)
        }
    };

    let mut entries = Vec::new();
    for (index, line) in lines.enumerate() {
        let fields: Vec<&str> = line
            .split(delimiter)
            .map(|f| f.trim().trim_matches('"'))
            .collect();

        let Some(time) = fields.get(time_col).and_then(|f| f.parse::<f64>().ok()) else {
            log::warn!("BEATMAP: Skipping row {}: bad time in {:?}", index + 2, line);
            continue;
        };
        if !time.is_finite() {
            log::warn!("BEATMAP: Skipping row {}: non-finite time", index + 2);
            continue;
        }

        // A missing or empty code is patched like an unknown one.
        let code = fields
            .get(note_col)
            .and_then(|f| f.chars().next())
            .unwrap_or('?');

        entries.push(BeatmapEntry { time, code });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_sorted(notes: &[Note]) -> bool {
        notes.windows(2).all(|w| w[0].spawn_time <= w[1].spawn_time)
    }

    #[test]
    fn sorts_unordered_rows() {
        let notes = parse_beatmap("time,note\n3.5,a\n1.0,g\n2.25,m\n1.0,f\n");
        assert_eq!(notes.len(), 4);
        assert!(is_sorted(&notes));
        assert_eq!(notes[0].kind, NoteKind::Grave);
        assert_eq!(notes[1].kind, NoteKind::Flam);
        assert!(notes.iter().all(|n| n.hit_time == n.spawn_time && !n.spawned));
    }

    #[test]
    fn unknown_codes_fall_back_to_default() {
        let notes = parse_beatmap("time,note\n1.0,z\n2.0,\n3.0,G\n");
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].kind, NoteKind::DEFAULT);
        assert_eq!(notes[1].kind, NoteKind::DEFAULT);
        assert_eq!(notes[2].kind, NoteKind::Grave);
    }

    #[test]
    fn bad_rows_do_not_abort_the_load() {
        let notes = parse_beatmap("time,note\nabc,a\n1.5,m\nNaN,g\n0.5,a\n");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].spawn_time, 0.5);
    }

    #[test]
    fn columns_are_found_by_name() {
        let notes = parse_beatmap("Nota;Tempo\nm;2.0\ng;1.0\n");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].kind, NoteKind::Grave);
        assert_eq!(notes[1].spawn_time, 2.0);
    }

    #[test]
    fn missing_file_yields_empty_chart() {
        let path = std::env::temp_dir().join("engrenada_missing_chart_does_not_exist.csv");
        assert!(load_beatmap(&path).is_empty());
        assert!(parse_beatmap("").is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join("engrenada_beatmap_loads_from_disk.csv");
        fs::write(&path, "time,note\n2.0,a\n1.0,f\n").unwrap();
        let notes = load_beatmap(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(notes.len(), 2);
        assert!(is_sorted(&notes));
    }
}
