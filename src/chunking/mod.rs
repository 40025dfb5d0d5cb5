// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Turns a tabular report of documents into overlapping text chunks ready
//! for embedding.

pub mod directory;
pub mod report;
pub mod setup;
pub mod splitter;

use std::path::PathBuf;
use thiserror::Error;

pub use self::directory::{ChunkOptions, ChunkRecord, SearchDirectory};
pub use self::setup::SetupData;
pub use self::splitter::TextChunker;

pub const REPORT_FILE: &str = "report.csv";
pub const CHUNKS_FILE: &str = "data_chunked.csv";
pub const SETUP_FILE: &str = "setup_data.json";

pub const DEFAULT_PATH_COLUMN: &str = "File Path";
pub const DEFAULT_TEXT_COLUMN: &str = "Text";
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_CHUNK_OVERLAP: usize = 10;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error(
        "No input file specified and no report provided in {0}. Provide a path to a .csv file or run report_from_directory first."
    )]
    NoInput(PathBuf),

    #[error("File path {0} is not a .csv file.")]
    FileType(PathBuf),

    #[error("'{column}' is not a column in {file}.")]
    MissingColumn { column: String, file: PathBuf },

    #[error("Invalid chunking parameters: {0}")]
    InvalidChunking(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
