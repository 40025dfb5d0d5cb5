// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::chunking::report::write_text_report;
use crate::chunking::{
    ChunkError, SetupData, TextChunker, CHUNKS_FILE, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_PATH_COLUMN, DEFAULT_TEXT_COLUMN, REPORT_FILE,
};
use crate::config::Settings;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOptions {
    /// CSV to read; `report.csv` in the working folder when `None`.
    pub input_file: Option<PathBuf>,
    pub path_column: String,
    pub text_column: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub show_progress: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            input_file: None,
            path_column: DEFAULT_PATH_COLUMN.to_string(),
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            show_progress: false,
        }
    }
}

impl ChunkOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            show_progress: settings.show_progress,
            ..Self::default()
        }
    }

    pub fn with_input(mut self, input_file: impl Into<PathBuf>) -> Self {
        self.input_file = Some(input_file.into());
        self
    }

    pub fn with_columns(mut self, path_column: &str, text_column: &str) -> Self {
        self.path_column = path_column.to_string();
        self.text_column = text_column.to_string();
        self
    }
}

/// Working folder holding the report, chunk data and setup metadata of one
/// document collection.
#[derive(Debug, Clone)]
pub struct SearchDirectory {
    folder_path: PathBuf,
    chunks_path: Option<PathBuf>,
    encoding_name: Option<String>,
    n_chunks: Option<usize>,
}

impl SearchDirectory {
    /// Opens `folder_path`, picking up chunk data and setup metadata from a
    /// previous run if present. Nothing is written.
    pub fn open(folder_path: impl Into<PathBuf>) -> Result<Self, ChunkError> {
        let folder_path = folder_path.into();

        let chunks_file = folder_path.join(CHUNKS_FILE);
        let chunks_path = chunks_file.exists().then_some(chunks_file);

        let (encoding_name, n_chunks) = match SetupData::load(&folder_path)? {
            Some(setup) => (setup.encoding_model, Some(setup.number_of_chunks)),
            None => (None, None),
        };

        Ok(Self {
            folder_path,
            chunks_path,
            encoding_name,
            n_chunks,
        })
    }

    pub fn folder_path(&self) -> &Path {
        &self.folder_path
    }

    pub fn chunks_path(&self) -> Option<&Path> {
        self.chunks_path.as_deref()
    }

    pub fn encoding_name(&self) -> Option<&str> {
        self.encoding_name.as_deref()
    }

    pub fn n_chunks(&self) -> Option<usize> {
        self.n_chunks
    }

    pub fn report_path(&self) -> PathBuf {
        self.folder_path.join(REPORT_FILE)
    }

    /// Writes `report.csv` for the text files under `directory_path`.
    pub fn report_from_directory(&self, directory_path: impl AsRef<Path>) -> Result<usize, ChunkError> {
        let rows = write_text_report(directory_path.as_ref(), &self.report_path())?;
        info!(
            "Report of {} documents saved to {}",
            rows,
            self.report_path().display()
        );
        Ok(rows)
    }

    /// Records the embedding model used for the chunks and rewrites the
    /// setup metadata.
    pub fn set_encoding_model(&mut self, name: &str) -> Result<(), ChunkError> {
        self.encoding_name = Some(name.to_string());
        self.save_setup()
    }

    fn save_setup(&self) -> Result<(), ChunkError> {
        SetupData {
            encoding_model: self.encoding_name.clone(),
            number_of_chunks: self.n_chunks.unwrap_or(0),
        }
        .save(&self.folder_path)
    }

    fn resolve_input(&self, options: &ChunkOptions) -> Result<PathBuf, ChunkError> {
        let input = match &options.input_file {
            Some(path) => path.clone(),
            None => {
                let report = self.report_path();
                if !report.exists() {
                    return Err(ChunkError::NoInput(self.folder_path.clone()));
                }
                report
            }
        };

        let is_csv = input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ChunkError::FileType(input));
        }

        Ok(input)
    }

    /// Splits every document of the input CSV into chunks and writes
    /// `data_chunked.csv` and `setup_data.json`. Returns the chunk count.
    pub fn chunk_text(&mut self, options: &ChunkOptions) -> Result<usize, ChunkError> {
        let input = self.resolve_input(options)?;

        let mut reader = csv::Reader::from_path(&input)?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ChunkError::MissingColumn {
                    column: name.to_string(),
                    file: input.clone(),
                })
        };
        let path_idx = column(&options.path_column)?;
        let text_idx = column(&options.text_column)?;
        let chunker = TextChunker::new(options.chunk_size, options.chunk_overlap)?;

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        info!("Total rows (excluding header): {}", rows.len());

        let progress = if options.show_progress {
            progress_bar(rows.len() as u64)
        } else {
            ProgressBar::hidden()
        };

        let mut records = Vec::new();
        for row in &rows {
            let file_path = row.get(path_idx).unwrap_or_default();
            let content = row.get(text_idx).unwrap_or_default();

            for chunk in chunker.split(content)? {
                records.push(ChunkRecord {
                    file_path: file_path.to_string(),
                    content: chunk,
                });
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        let chunks_path = self.folder_path.join(CHUNKS_FILE);
        write_chunks(&chunks_path, &records)?;

        self.chunks_path = Some(chunks_path);
        self.n_chunks = Some(records.len());
        self.save_setup()?;

        info!(
            "Chunking complete: {} chunks saved to '{}'",
            records.len(),
            CHUNKS_FILE
        );
        Ok(records.len())
    }

    /// Reads the chunk data written by [`SearchDirectory::chunk_text`].
    pub fn load_chunks(&self) -> Result<Vec<ChunkRecord>, ChunkError> {
        let path = self
            .chunks_path
            .as_ref()
            .ok_or_else(|| ChunkError::NoInput(self.folder_path.clone()))?;

        let mut reader = csv::Reader::from_path(path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ChunkRecord>, _>>()?;
        Ok(records)
    }
}

fn write_chunks(path: &Path, records: &[ChunkRecord]) -> Result<(), ChunkError> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(["file_path", "content"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("Processing rows");
    pb
}
