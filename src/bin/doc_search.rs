// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use doc_search::chunking::{ChunkOptions, SearchDirectory};
use doc_search::config::Settings;
use doc_search::index::{
    create_flat_index, create_hnsw_index, create_ivf_flat_index, load_index, QueryParams,
    SearchIndex,
};
use doc_search::{DatasetVariability, EmbeddingMatrix, Metric};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "doc_search", about = "Document chunking and vector index tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexType {
    Flat,
    Ivf,
    Hnsw,
}

#[derive(Subcommand)]
enum Command {
    /// Write report.csv for the text files in a directory
    Report {
        #[arg(long)]
        folder: PathBuf,
        #[arg(long)]
        dir: PathBuf,
    },
    /// Split report (or another CSV) text into overlapping chunks
    Chunk {
        #[arg(long)]
        folder: PathBuf,
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "File Path")]
        path_column: String,
        #[arg(long, default_value = "Text")]
        text_column: String,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },
    /// Build an index from a JSON embedding matrix
    BuildIndex {
        #[arg(long)]
        embeddings: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value = "flat")]
        kind: IndexType,
        /// L2 or IP
        #[arg(long)]
        metric: Option<String>,
        #[arg(long)]
        nlist: Option<usize>,
        #[arg(long)]
        m: Option<usize>,
        #[arg(long)]
        ef_construction: Option<usize>,
    },
    /// Query a saved index with a JSON matrix of query vectors
    Query {
        #[arg(long)]
        index: PathBuf,
        #[arg(long)]
        queries: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        k: usize,
        #[arg(long)]
        nprobe: Option<usize>,
        #[arg(long)]
        ef_search: Option<usize>,
    },
    /// Print variance and mean cosine similarity of an embedding matrix
    Stats {
        #[arg(long)]
        embeddings: PathBuf,
        #[arg(long)]
        no_normalize: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_search=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Report { folder, dir } => {
            let search = SearchDirectory::open(&folder)?;
            search
                .report_from_directory(&dir)
                .with_context(|| format!("failed to report on {}", dir.display()))?;
        }
        Command::Chunk {
            folder,
            input,
            path_column,
            text_column,
            chunk_size,
            chunk_overlap,
        } => {
            let mut search = SearchDirectory::open(&folder)?;
            let mut options =
                ChunkOptions::from_settings(&settings).with_columns(&path_column, &text_column);
            options.input_file = input;
            if let Some(size) = chunk_size {
                options.chunk_size = size;
            }
            if let Some(overlap) = chunk_overlap {
                options.chunk_overlap = overlap;
            }
            let n = search.chunk_text(&options)?;
            println!("{}", n);
        }
        Command::BuildIndex {
            embeddings,
            output,
            kind,
            metric,
            nlist,
            m,
            ef_construction,
        } => {
            let matrix = EmbeddingMatrix::from_json_file(&embeddings)
                .with_context(|| format!("failed to load {}", embeddings.display()))?;
            let metric = metric
                .map(|m| Metric::parse_or_default(&m))
                .unwrap_or(settings.metric);

            let ntotal = match kind {
                IndexType::Flat => create_flat_index(&matrix, Some(output.as_path()), metric)?.ntotal(),
                IndexType::Ivf => {
                    create_ivf_flat_index(&matrix, nlist, Some(output.as_path()), metric)?.ntotal()
                }
                IndexType::Hnsw => create_hnsw_index(
                    &matrix,
                    Some(m.unwrap_or(settings.hnsw_m)),
                    Some(ef_construction.unwrap_or(settings.hnsw_ef_construction)),
                    Some(output.as_path()),
                    metric,
                )?
                .ntotal(),
            };
            info!("Indexed {} vectors into {}", ntotal, output.display());
        }
        Command::Query {
            index,
            queries,
            k,
            nprobe,
            ef_search,
        } => {
            let mut loaded = load_index(&index)?;
            let xq = EmbeddingMatrix::from_json_file(&queries)
                .with_context(|| format!("failed to load {}", queries.display()))?;
            let results = loaded.query_with_params(&xq, k, QueryParams { nprobe, ef_search })?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Stats {
            embeddings,
            no_normalize,
        } => {
            let matrix = EmbeddingMatrix::from_json_file(&embeddings)
                .with_context(|| format!("failed to load {}", embeddings.display()))?;
            let report = DatasetVariability::new(matrix, !no_normalize).report();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
