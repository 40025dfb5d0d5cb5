// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::clustered_embeddings;
use doc_search::core::types::Metric;
use doc_search::index::{FlatIndex, IndexError, IvfFlatIndex, SearchIndex};

#[cfg(test)]
mod ivf_flat_construction_tests {
    use super::*;

    #[test]
    fn test_default_nlist() {
        assert_eq!(IvfFlatIndex::default_nlist(0), 1);
        assert_eq!(IvfFlatIndex::default_nlist(1), 1);
        assert_eq!(IvfFlatIndex::default_nlist(200), 10);
        assert_eq!(IvfFlatIndex::default_nlist(1000), 22);

        let data = clustered_embeddings(200, 4, 5, 3);
        let index = IvfFlatIndex::with_seed(&data, None, Metric::L2, Some(1)).unwrap();
        assert_eq!(index.nlist(), 10);
        assert_eq!(index.nprobe(), 1);
        assert_eq!(index.ntotal(), 200);
        assert_eq!(index.kind(), "IndexIVFFlat");
    }

    #[test]
    fn test_nlist_zero_rejected() {
        let data = clustered_embeddings(20, 4, 2, 3);
        let err = IvfFlatIndex::new(&data, Some(0), Metric::L2).unwrap_err();

        assert!(matches!(err, IndexError::UnsupportedHyperparameter(_)));
        assert!(err.to_string().contains("nlist cannot be less than 1"));
    }

    #[test]
    fn test_nlist_larger_than_documents() {
        let data = clustered_embeddings(5, 4, 1, 3);
        let err = IvfFlatIndex::new(&data, Some(6), Metric::L2).unwrap_err();

        assert!(err
            .to_string()
            .contains("nlist value of 6 is larger than the number of documents in the index"));
    }

    #[test]
    fn test_nlist_equal_to_documents() {
        let data = clustered_embeddings(5, 4, 5, 3);
        let index = IvfFlatIndex::with_seed(&data, Some(5), Metric::L2, Some(2)).unwrap();
        assert_eq!(index.nlist(), 5);
    }
}

#[cfg(test)]
mod ivf_flat_query_tests {
    use super::*;

    #[test]
    fn test_nprobe_range() {
        let data = clustered_embeddings(100, 4, 4, 5);
        let mut index = IvfFlatIndex::with_seed(&data, Some(4), Metric::L2, Some(3)).unwrap();

        for bad in [0, 5] {
            let err = index.query_with(&data, 1, Some(bad)).unwrap_err();
            assert!(err.to_string().contains("nprobe must be between 1 and 4"));
        }

        index.query_with(&data, 1, Some(3)).unwrap();
        assert_eq!(index.nprobe(), 3);
    }

    #[test]
    fn test_full_probe_matches_flat() {
        let data = clustered_embeddings(150, 8, 5, 21);
        let queries = clustered_embeddings(10, 8, 5, 99);

        let flat = FlatIndex::new(&data, Metric::L2).unwrap();
        let mut ivf = IvfFlatIndex::with_seed(&data, Some(8), Metric::L2, Some(4)).unwrap();

        let expected = flat.query(&queries, 5).unwrap();
        let actual = ivf.query_with(&queries, 5, Some(8)).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_self_match_with_single_probe() {
        let data = clustered_embeddings(120, 8, 4, 13);
        let index = IvfFlatIndex::with_seed(&data, Some(4), Metric::L2, Some(5)).unwrap();

        // A stored vector always lives in its own closest cluster
        let results = index.query(&data, 1).unwrap();
        for (i, hits) in results.iter().enumerate() {
            assert_eq!(hits[0].label, i as i64);
        }
    }

    #[test]
    fn test_k_must_be_positive() {
        let data = clustered_embeddings(20, 4, 2, 1);
        let mut index = IvfFlatIndex::new(&data, None, Metric::L2).unwrap();

        assert!(matches!(
            index.query_with(&data, 0, None),
            Err(IndexError::UnsupportedHyperparameter(_))
        ));
    }

    #[test]
    fn test_inner_product_metric() {
        let data = clustered_embeddings(40, 4, 2, 8);
        let mut index = IvfFlatIndex::with_seed(&data, Some(2), Metric::InnerProduct, Some(6)).unwrap();
        let flat = FlatIndex::new(&data, Metric::InnerProduct).unwrap();

        assert_eq!(index.metric(), Metric::InnerProduct);
        let actual = index.query_with(&data, 3, Some(2)).unwrap();
        assert_eq!(actual, flat.query(&data, 3).unwrap());
        for hits in &actual {
            assert!(hits.windows(2).all(|w| w[0].distance >= w[1].distance));
        }
    }
}
