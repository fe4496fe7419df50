//! Settlement rate file discovery.
//!
//! Rate files are dropped into a directory as `<prefix>_<YYMMDD>_<suffix>.sw0`.
//! The newest one is the file with the largest number between the two
//! underscores.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{FeedError, FeedResult};

/// Extension of settlement rate files.
pub const RATE_FILE_EXTENSION: &str = ".sw0";

/// Sequence number embedded in a valid rate file name.
///
/// Returns `None` unless the name ends with `.sw0`, has exactly two
/// underscores, and the part between them is all digits.
pub fn rate_file_sequence(file_name: &str) -> Option<u64> {
    if !file_name.ends_with(RATE_FILE_EXTENSION) {
        return None;
    }

    let parts: Vec<&str> = file_name.split('_').collect();
    if parts.len() != 3 {
        return None;
    }

    let middle = parts[1];
    if middle.is_empty() || !middle.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    middle.parse().ok()
}

/// Find the newest rate file in `dir`.
///
/// Returns `Ok(None)` when the directory holds no valid rate file, and
/// [`FeedError::EmptyFile`] when the newest one has no content.
pub fn latest_rate_file(dir: &Path) -> FeedResult<Option<PathBuf>> {
    let mut latest: Option<(u64, String)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Some(sequence) = rate_file_sequence(&name) else {
            debug!(file = %name, "Ignoring file that is not a rate file");
            continue;
        };

        let newer = match &latest {
            None => true,
            Some((best, best_name)) => (sequence, &name) > (*best, best_name),
        };
        if newer {
            latest = Some((sequence, name));
        }
    }

    let Some((_, name)) = latest else {
        return Ok(None);
    };

    let path = dir.join(&name);
    if std::fs::metadata(&path)?.len() == 0 {
        return Err(FeedError::EmptyFile(path));
    }

    info!(file = %name, "Selected exchange rates file");
    Ok(Some(path))
}
