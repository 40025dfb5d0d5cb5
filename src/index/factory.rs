// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::Metric;
use crate::index::file::IndexFile;
use crate::index::{
    AnyIndex, FlatIndex, GeneralIndex, HnswIndex, IndexError, IndexKind, IvfFlatIndex,
    SearchIndex,
};
use std::path::Path;
use tracing::{info, warn};

/// Loads an index file and wraps it in the matching variant. Files of an
/// unknown kind load as [`AnyIndex::General`].
pub fn load_index(file_path: impl AsRef<Path>) -> Result<AnyIndex, IndexError> {
    let path = file_path.as_ref();
    let file = IndexFile::read(path)?;

    let index = match IndexKind::from_tag(&file.kind) {
        Some(IndexKind::Flat) => AnyIndex::Flat(FlatIndex::from_file(file)?),
        Some(IndexKind::IvfFlat) => AnyIndex::IvfFlat(IvfFlatIndex::from_file(file)?),
        Some(IndexKind::Hnsw) => AnyIndex::Hnsw(HnswIndex::from_file(file)?),
        None => {
            warn!(
                "Index kind '{}' in {} has no wrapper; loading as general index",
                file.kind,
                path.display()
            );
            AnyIndex::General(GeneralIndex::from_file(file))
        }
    };

    info!(
        "Loaded {} from {} ({} vectors)",
        index.kind(),
        path.display(),
        index.ntotal()
    );
    Ok(index)
}

fn save_if_requested(index: &dyn SearchIndex, file_path: Option<&Path>) -> Result<(), IndexError> {
    if let Some(path) = file_path {
        index.save_index(path)?;
        info!("Saved {} to {}", index.kind(), path.display());
    }
    Ok(())
}

/// Builds an exact index, saving it to `file_path` when given.
pub fn create_flat_index(
    embeddings: &EmbeddingMatrix,
    file_path: Option<&Path>,
    metric: Metric,
) -> Result<FlatIndex, IndexError> {
    let index = FlatIndex::new(embeddings, metric)?;
    save_if_requested(&index, file_path)?;
    Ok(index)
}

/// Builds an IVF-Flat index with `nlist` clusters, or the default for the
/// number of documents when `None`.
pub fn create_ivf_flat_index(
    embeddings: &EmbeddingMatrix,
    nlist: Option<usize>,
    file_path: Option<&Path>,
    metric: Metric,
) -> Result<IvfFlatIndex, IndexError> {
    let index = IvfFlatIndex::new(embeddings, nlist, metric)?;
    save_if_requested(&index, file_path)?;
    Ok(index)
}

/// Builds an HNSW index; `m` and `ef_construction` default to 64.
pub fn create_hnsw_index(
    embeddings: &EmbeddingMatrix,
    m: Option<usize>,
    ef_construction: Option<usize>,
    file_path: Option<&Path>,
    metric: Metric,
) -> Result<HnswIndex, IndexError> {
    let index = HnswIndex::new(embeddings, m, ef_construction, metric)?;
    save_if_requested(&index, file_path)?;
    Ok(index)
}
