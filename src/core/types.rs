// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Position of a vector inside an index, assigned in insertion order.
pub type Label = i64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown metric '{0}': expected L2 or IP")]
pub struct UnknownMetric(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Squared Euclidean distance, smaller is closer.
    #[default]
    L2,
    /// Dot product, larger is closer.
    InnerProduct,
}

impl Metric {
    /// Parses a metric name, falling back to L2 for anything unrecognized.
    pub fn parse_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(metric) => metric,
            Err(e) => {
                tracing::warn!("{}; falling back to L2", e);
                Metric::L2
            }
        }
    }

    /// Raw metric value for a pair of vectors.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => crate::core::vector_ops::l2_squared(a, b),
            Metric::InnerProduct => crate::core::vector_ops::dot_product(a, b),
        }
    }

    /// Metric value mapped so that smaller always means closer.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => self.score(a, b),
            Metric::InnerProduct => -self.score(a, b),
        }
    }

    /// Inverse of the mapping applied by [`Metric::distance`].
    pub fn from_distance(&self, distance: f32) -> f32 {
        match self {
            Metric::L2 => distance,
            Metric::InnerProduct => -distance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::L2 => "L2",
            Metric::InnerProduct => "IP",
        }
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L2" => Ok(Metric::L2),
            "IP" | "INNER_PRODUCT" => Ok(Metric::InnerProduct),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One neighbor returned by a query. `distance` is the raw metric value:
/// squared L2 distance, or the inner product for [`Metric::InnerProduct`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub label: Label,
    pub distance: f32,
}

impl SearchResult {
    pub fn new(label: Label, distance: f32) -> Self {
        SearchResult { label, distance }
    }
}
