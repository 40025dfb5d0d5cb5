// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::chunking::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::core::types::Metric;
use crate::index::hnsw::{DEFAULT_EF_CONSTRUCTION, DEFAULT_M};
use std::env;
use std::str::FromStr;
use tracing::{info, warn};

/// Process-wide defaults, read from `DOC_SEARCH_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub metric: Metric,
    pub hnsw_m: usize,
    pub hnsw_ef_construction: usize,
    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            metric: Metric::L2,
            hnsw_m: DEFAULT_M,
            hnsw_ef_construction: DEFAULT_EF_CONSTRUCTION,
            show_progress: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let settings = Self {
            chunk_size: parse_var("DOC_SEARCH_CHUNK_SIZE").unwrap_or(defaults.chunk_size),
            chunk_overlap: parse_var("DOC_SEARCH_CHUNK_OVERLAP").unwrap_or(defaults.chunk_overlap),
            metric: env::var("DOC_SEARCH_METRIC")
                .map(|m| Metric::parse_or_default(&m))
                .unwrap_or(defaults.metric),
            hnsw_m: parse_var("DOC_SEARCH_HNSW_M").unwrap_or(defaults.hnsw_m),
            hnsw_ef_construction: parse_var("DOC_SEARCH_HNSW_EF_CONSTRUCTION")
                .unwrap_or(defaults.hnsw_ef_construction),
            show_progress: parse_var("DOC_SEARCH_PROGRESS").unwrap_or(defaults.show_progress),
        };

        Self::log_configuration_summary(&settings);
        settings
    }

    fn log_configuration_summary(settings: &Settings) {
        info!(
            "Configuration: chunk_size={}, chunk_overlap={}, metric={}, M={}, efConstruction={}",
            settings.chunk_size,
            settings.chunk_overlap,
            settings.metric,
            settings.hnsw_m,
            settings.hnsw_ef_construction
        );
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", name, raw);
            None
        }
    }
}
