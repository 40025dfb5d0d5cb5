// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::{clustered_embeddings, single_row};
use doc_search::core::matrix::EmbeddingMatrix;
use doc_search::core::types::Metric;
use doc_search::index::{FlatIndex, IndexError, SearchIndex};

#[cfg(test)]
mod flat_index_tests {
    use super::*;

    #[test]
    fn test_exact_self_match() {
        let data = clustered_embeddings(50, 8, 3, 9);
        let index = FlatIndex::new(&data, Metric::L2).unwrap();

        assert_eq!(index.ntotal(), 50);
        assert_eq!(index.dimension(), 8);
        assert_eq!(index.kind(), "IndexFlat");

        let results = index.query(&data, 1).unwrap();
        assert_eq!(results.len(), 50);
        for (i, hits) in results.iter().enumerate() {
            assert_eq!(hits[0].label, i as i64);
            assert_eq!(hits[0].distance, 0.0);
        }
    }

    #[test]
    fn test_l2_distances_are_squared() {
        let data = EmbeddingMatrix::from_rows(vec![vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        let index = FlatIndex::new(&data, Metric::L2).unwrap();

        let hits = index.query(&single_row(&[0.0, 0.0]), 2).unwrap();
        assert_eq!(hits[0][1].label, 1);
        assert_eq!(hits[0][1].distance, 25.0);
    }

    #[test]
    fn test_inner_product_ranks_largest_first() {
        let data =
            EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![2.0, 0.0]])
                .unwrap();
        let index = FlatIndex::new(&data, Metric::InnerProduct).unwrap();

        let hits = &index.query(&single_row(&[1.0, 0.0]), 3).unwrap()[0];
        let labels: Vec<i64> = hits.iter().map(|h| h.label).collect();
        assert_eq!(labels, vec![2, 0, 1]);
        assert_eq!(hits[0].distance, 2.0);
    }

    #[test]
    fn test_k_must_be_positive() {
        let data = clustered_embeddings(10, 4, 2, 1);
        let index = FlatIndex::new(&data, Metric::L2).unwrap();

        let err = index.query(&data, 0).unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedHyperparameter(_)));
        assert!(err.to_string().contains("k cannot be less than 1"));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let data = clustered_embeddings(10, 4, 2, 1);
        let index = FlatIndex::new(&data, Metric::L2).unwrap();

        assert!(matches!(
            index.query(&single_row(&[1.0, 2.0]), 1),
            Err(IndexError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_add_extends_labels() {
        let data = clustered_embeddings(10, 4, 2, 1);
        let mut index = FlatIndex::new(&data, Metric::L2).unwrap();

        let extra = single_row(&[100.0, 100.0, 100.0, 100.0]);
        index.add(&extra).unwrap();

        assert_eq!(index.ntotal(), 11);
        let hits = index.query(&extra, 1).unwrap();
        assert_eq!(hits[0][0].label, 10);
    }

    #[test]
    fn test_k_larger_than_index() {
        let data = clustered_embeddings(3, 4, 1, 2);
        let index = FlatIndex::new(&data, Metric::L2).unwrap();

        let hits = index.query(&single_row(data.row(0)), 10).unwrap();
        assert_eq!(hits[0].len(), 3);
    }
}
