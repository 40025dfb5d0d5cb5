// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::clustered_embeddings;
use doc_search::core::types::Metric;
use doc_search::index::hnsw::{DEFAULT_EF_CONSTRUCTION, DEFAULT_EF_SEARCH, DEFAULT_M};
use doc_search::index::{FlatIndex, HnswIndex, IndexError, SearchIndex};

#[cfg(test)]
mod hnsw_index_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let data = clustered_embeddings(30, 4, 3, 2);
        let index = HnswIndex::with_seed(&data, None, None, Metric::L2, Some(7)).unwrap();

        assert_eq!(index.m(), DEFAULT_M);
        assert_eq!(index.ef_construction(), DEFAULT_EF_CONSTRUCTION);
        assert_eq!(index.ef_search(), DEFAULT_EF_SEARCH);
        assert_eq!(index.ntotal(), 30);
        assert_eq!(index.kind(), "IndexHNSWFlat");
    }

    #[test]
    fn test_invalid_build_parameters() {
        let data = clustered_embeddings(10, 4, 2, 2);

        let err = HnswIndex::new(&data, Some(0), None, Metric::L2).unwrap_err();
        assert!(err.to_string().contains("M cannot be less than 1"));

        let err = HnswIndex::new(&data, None, Some(0), Metric::L2).unwrap_err();
        assert!(err.to_string().contains("efConstruction cannot be less than 1"));
    }

    #[test]
    fn test_ef_search_validation_and_persistence() {
        let data = clustered_embeddings(40, 4, 2, 2);
        let mut index = HnswIndex::with_seed(&data, Some(8), Some(32), Metric::L2, Some(1)).unwrap();

        let err = index.query_with(&data, 1, Some(0)).unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedHyperparameter(_)));
        assert!(err.to_string().contains("efSearch cannot be less than 1"));
        assert_eq!(index.ef_search(), DEFAULT_EF_SEARCH);

        index.query_with(&data, 1, Some(50)).unwrap();
        assert_eq!(index.ef_search(), 50);
    }

    #[test]
    fn test_k_must_be_positive() {
        let data = clustered_embeddings(10, 4, 2, 2);
        let index = HnswIndex::new(&data, None, None, Metric::L2).unwrap();

        assert!(matches!(
            index.query(&data, 0),
            Err(IndexError::UnsupportedHyperparameter(_))
        ));
    }

    #[test]
    fn test_recall_against_flat() {
        let data = clustered_embeddings(500, 16, 10, 31);
        let queries = clustered_embeddings(50, 16, 10, 77);

        let flat = FlatIndex::new(&data, Metric::L2).unwrap();
        let mut hnsw = HnswIndex::with_seed(&data, Some(16), Some(64), Metric::L2, Some(3)).unwrap();

        let exact = flat.query(&queries, 1).unwrap();
        let approx = hnsw.query_with(&queries, 1, Some(64)).unwrap();

        let hits = exact
            .iter()
            .zip(&approx)
            .filter(|(e, a)| e[0].label == a[0].label)
            .count();
        assert!(hits >= 45, "recall@1 too low: {}/50", hits);
    }

    #[test]
    fn test_self_match() {
        let data = clustered_embeddings(100, 8, 4, 12);
        let index = HnswIndex::with_seed(&data, Some(16), None, Metric::L2, Some(5)).unwrap();

        let results = index.query(&data, 1).unwrap();
        let exact = results
            .iter()
            .enumerate()
            .filter(|(i, hits)| hits[0].label == *i as i64)
            .count();
        assert!(exact >= 95);
    }
}
