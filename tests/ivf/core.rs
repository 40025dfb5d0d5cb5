// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use doc_search::core::matrix::EmbeddingMatrix;
use doc_search::core::types::Metric;
use doc_search::ivf::core::*;

fn config(n_clusters: usize) -> IVFConfig {
    IVFConfig {
        n_clusters,
        n_probe: 1,
        max_iterations: 25,
        seed: Some(42),
    }
}

#[cfg(test)]
mod ivf_structure_tests {
    use super::*;

    #[test]
    fn test_ivf_config_validation() {
        assert!(config(4).is_valid());
        assert!(!config(0).is_valid());

        let probe_too_wide = IVFConfig {
            n_probe: 5,
            ..config(4)
        };
        assert!(!probe_too_wide.is_valid());
        assert!(IVFIndex::new(2, Metric::L2, probe_too_wide).is_err());
    }

    #[test]
    fn test_ivf_index_initialization() {
        let index = IVFIndex::new(3, Metric::L2, config(4)).unwrap();

        assert!(!index.is_trained());
        assert_eq!(index.dimension(), 3);
        assert_eq!(index.total_vectors(), 0);
    }

    #[test]
    fn test_insert_before_training() {
        let mut index = IVFIndex::new(2, Metric::L2, config(2)).unwrap();

        assert_eq!(index.insert(&[1.0, 2.0]), Err(IVFError::NotTrained));
        assert!(matches!(index.search(&[1.0, 2.0], 1), Err(IVFError::NotTrained)));
    }
}

#[cfg(test)]
mod ivf_training_tests {
    use super::*;

    #[test]
    fn test_train_simple_2d() {
        let data = EmbeddingMatrix::from_rows(vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.2, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.2],
            vec![9.9, 10.0],
        ])
        .unwrap();

        let mut index = IVFIndex::new(2, Metric::L2, config(2)).unwrap();
        let result = index.train(&data).unwrap();

        assert!(index.is_trained());
        assert!(result.iterations >= 1);
        assert!(result.final_error <= result.initial_error);
        assert_eq!(index.get_centroids().len(), 2);

        let low = index.insert(&[0.05, 0.05]).unwrap();
        let high = index.insert(&[10.0, 10.1]).unwrap();
        assert_eq!((low, high), (0, 1));

        // The two blobs end up in different clusters
        let stats = index.get_cluster_stats();
        assert_eq!(stats.total_vectors, 2);
        assert_eq!(stats.empty_clusters, 0);
    }

    #[test]
    fn test_insufficient_training_data() {
        let data = EmbeddingMatrix::from_rows(vec![vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
        let mut index = IVFIndex::new(2, Metric::L2, config(3)).unwrap();

        assert_eq!(
            index.train(&data).unwrap_err(),
            IVFError::InsufficientTrainingData { got: 2, need: 3 }
        );
    }

    #[test]
    fn test_training_dimension_mismatch() {
        let data = crate::clustered_embeddings(20, 4, 2, 1);
        let mut index = IVFIndex::new(3, Metric::L2, config(2)).unwrap();

        assert!(matches!(
            index.train(&data),
            Err(IVFError::DimensionMismatch { expected: 3, actual: 4 })
        ));
    }

    #[test]
    fn test_duplicate_points_train() {
        let data = EmbeddingMatrix::from_rows(vec![vec![1.0, 1.0]; 8]).unwrap();
        let mut index = IVFIndex::new(2, Metric::L2, config(4)).unwrap();

        index.train(&data).unwrap();
        assert_eq!(index.get_centroids().len(), 4);
    }
}

#[cfg(test)]
mod ivf_search_tests {
    use super::*;

    #[test]
    fn test_all_vectors_assigned() {
        let data = crate::clustered_embeddings(200, 8, 5, 11);
        let mut index = IVFIndex::new(8, Metric::L2, config(5)).unwrap();
        index.train(&data).unwrap();
        let labels = index.batch_insert(&data).unwrap();

        assert_eq!(labels, 0..200);
        let assigned: usize = (0..5).map(|i| index.get_cluster_size(ClusterId(i))).sum();
        assert_eq!(assigned, 200);
    }

    #[test]
    fn test_probing_every_cluster_is_exhaustive() {
        let data = crate::clustered_embeddings(120, 6, 4, 5);
        let mut index = IVFIndex::new(6, Metric::L2, config(6)).unwrap();
        index.train(&data).unwrap();
        index.batch_insert(&data).unwrap();

        for i in [0, 17, 63, 119] {
            let results = index.search_with_config(data.row(i), 1, 6).unwrap();
            assert_eq!(results[0].label, i as i64);
            assert_eq!(results[0].distance, 0.0);
        }
    }
}
