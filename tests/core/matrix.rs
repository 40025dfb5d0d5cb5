// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use approx::assert_relative_eq;
use doc_search::core::matrix::{EmbeddingMatrix, MatrixError};
use doc_search::core::types::Metric;
use proptest::prelude::*;

#[cfg(test)]
mod matrix_tests {
    use super::*;

    #[test]
    fn test_from_rows_shape() {
        let m = EmbeddingMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();

        assert_eq!(m.rows(), 2);
        assert_eq!(m.dim(), 3);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.to_rows().len(), 2);
    }

    #[test]
    fn test_zero_width_rows_rejected() {
        let err = EmbeddingMatrix::from_rows(vec![vec![], vec![]]).unwrap_err();
        assert!(matches!(err, MatrixError::ZeroDimension));
    }

    #[test]
    fn test_from_flat_requires_whole_rows() {
        assert!(EmbeddingMatrix::from_flat(2, vec![1.0, 2.0, 3.0]).is_err());
        let m = EmbeddingMatrix::from_flat(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.rows(), 2);
    }

    #[test]
    fn test_normalize_rows() {
        let m = EmbeddingMatrix::from_rows(vec![vec![3.0, 4.0], vec![0.0, 0.0]])
            .unwrap()
            .normalized();

        assert_relative_eq!(m.row(0)[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(m.row(0)[1], 0.8, epsilon = 1e-6);
        // Zero rows stay zero
        assert_eq!(m.row(1), &[0.0, 0.0]);
    }

    #[test]
    fn test_json_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        std::fs::write(&path, "[[0.5, 1.5], [2.0, -1.0]]").unwrap();

        let m = EmbeddingMatrix::from_json_file(&path).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(1), &[2.0, -1.0]);

        std::fs::write(&path, "{\"not\": \"a matrix\"}").unwrap();
        assert!(matches!(
            EmbeddingMatrix::from_json_file(&path),
            Err(MatrixError::Json(_))
        ));
    }
}

#[cfg(test)]
mod metric_tests {
    use super::*;

    #[test]
    fn test_metric_parsing() {
        assert_eq!("L2".parse::<Metric>().unwrap(), Metric::L2);
        assert_eq!("ip".parse::<Metric>().unwrap(), Metric::InnerProduct);
        assert!("cosine".parse::<Metric>().is_err());
        assert_eq!(Metric::parse_or_default("cosine"), Metric::L2);
    }

    #[test]
    fn test_metric_scores() {
        let a = [1.0, 2.0];
        let b = [3.0, 0.0];

        assert_relative_eq!(Metric::L2.score(&a, &b), 8.0);
        assert_relative_eq!(Metric::InnerProduct.score(&a, &b), 3.0);
        // Inner product is negated so smaller is closer
        assert_relative_eq!(Metric::InnerProduct.distance(&a, &b), -3.0);
    }
}

proptest! {
    #[test]
    fn prop_normalized_rows_have_unit_norm(
        rows in prop::collection::vec(prop::collection::vec(-100.0f32..100.0, 4), 1..20)
    ) {
        let m = EmbeddingMatrix::from_rows(rows).unwrap();
        let original = m.row_norms();
        let normalized = m.normalized();

        for (norm, before) in normalized.row_norms().into_iter().zip(original) {
            prop_assume!(before > 1e-3);
            prop_assert!((norm - 1.0).abs() < 1e-5);
        }
    }
}
