// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::chunking::{ChunkError, DEFAULT_PATH_COLUMN, DEFAULT_TEXT_COLUMN};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Writes a two-column report (`File Path`, `Text`) covering every UTF-8
/// text file under `directory`, sorted by path. Returns the number of rows.
///
/// Files that cannot be decoded as text are skipped.
pub fn write_text_report(directory: &Path, report_file: &Path) -> Result<usize, ChunkError> {
    if !directory.is_dir() {
        return Err(ChunkError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", directory.display()),
        )));
    }

    let mut writer = csv::Writer::from_path(report_file)?;
    writer.write_record([DEFAULT_PATH_COLUMN, DEFAULT_TEXT_COLUMN])?;

    let mut rows = 0;
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(|e| ChunkError::Io(e.into()))?;
        if !entry.file_type().is_file() || entry.path() == report_file {
            continue;
        }

        let text = match fs::read(entry.path()).map(String::from_utf8) {
            Ok(Ok(text)) => text,
            Ok(Err(_)) => {
                warn!("Skipping non-text file {}", entry.path().display());
                continue;
            }
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let path = entry.path().to_string_lossy();
        writer.write_record([path.as_ref(), text.as_str()])?;
        rows += 1;
    }
    writer.flush()?;

    debug!("Report of {} files written to {}", rows, report_file.display());
    Ok(rows)
}
