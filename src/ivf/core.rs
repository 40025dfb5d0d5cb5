// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::{Label, Metric, SearchResult};
use crate::core::vector_ops::{closest_k, into_results, l2_squared};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum IVFError {
    #[error("Index not trained. Call train() before inserting or searching.")]
    NotTrained,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Insufficient training data: got {got}, need at least {need}")]
    InsufficientTrainingData { got: usize, need: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IVFConfig {
    pub n_clusters: usize,
    pub n_probe: usize,
    pub max_iterations: usize,
    pub seed: Option<u64>,
}

impl Default for IVFConfig {
    fn default() -> Self {
        Self {
            n_clusters: 256,
            n_probe: 1,
            max_iterations: 25,
            seed: None,
        }
    }
}

impl IVFConfig {
    pub fn is_valid(&self) -> bool {
        self.n_clusters > 0
            && self.n_probe > 0
            && self.n_probe <= self.n_clusters
            && self.max_iterations > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub usize);

#[derive(Debug, Clone)]
pub struct TrainResult {
    pub iterations: usize,
    pub converged: bool,
    pub initial_error: f32,
    pub final_error: f32,
}

/// Vectors assigned to one cluster, stored row-major next to their labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedList {
    pub labels: Vec<Label>,
    pub vectors: Vec<f32>,
}

impl InvertedList {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn fresh_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Inverted-file index with a flat k-means coarse quantizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IVFIndex {
    config: IVFConfig,
    metric: Metric,
    dimension: usize,
    centroids: Vec<Vec<f32>>,
    inverted_lists: Vec<InvertedList>,
    trained: bool,
    total_vectors: usize,
    #[serde(skip, default = "fresh_rng")]
    rng: StdRng,
}

impl IVFIndex {
    pub fn new(dimension: usize, metric: Metric, config: IVFConfig) -> Result<Self, IVFError> {
        if !config.is_valid() {
            return Err(IVFError::InvalidConfig(format!("{:?}", config)));
        }
        if dimension == 0 {
            return Err(IVFError::InvalidConfig("dimension must be positive".into()));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            metric,
            dimension,
            centroids: Vec::new(),
            inverted_lists: Vec::new(),
            trained: false,
            total_vectors: 0,
            rng,
        })
    }

    pub fn config(&self) -> &IVFConfig {
        &self.config
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn n_clusters(&self) -> usize {
        self.config.n_clusters
    }

    pub fn total_vectors(&self) -> usize {
        self.total_vectors
    }

    pub fn get_centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    pub fn set_n_probe(&mut self, n_probe: usize) {
        self.config.n_probe = n_probe;
    }

    fn check_dimension(&self, len: usize) -> Result<(), IVFError> {
        if len != self.dimension {
            return Err(IVFError::DimensionMismatch {
                expected: self.dimension,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn train(&mut self, training_data: &EmbeddingMatrix) -> Result<TrainResult, IVFError> {
        if training_data.rows() < self.config.n_clusters {
            return Err(IVFError::InsufficientTrainingData {
                got: training_data.rows(),
                need: self.config.n_clusters,
            });
        }
        self.check_dimension(training_data.dim())?;

        // Initialize centroids with k-means++
        self.centroids = self.initialize_centroids(training_data);
        self.inverted_lists = vec![InvertedList::default(); self.config.n_clusters];

        // Run k-means
        let mut assignments = vec![ClusterId(0); training_data.rows()];
        let initial_error = self.compute_error(training_data, &assignments);
        let mut prev_error = f32::INFINITY;
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..self.config.max_iterations {
            iterations = iter + 1;

            // Assignment step
            let mut changed = false;
            for (i, vector) in training_data.iter_rows().enumerate() {
                let new_cluster = self.nearest_centroid_l2(vector);
                if new_cluster != assignments[i] {
                    changed = true;
                    assignments[i] = new_cluster;
                }
            }

            // Update step
            self.update_centroids(training_data, &assignments);

            let current_error = self.compute_error(training_data, &assignments);
            let error_change = if prev_error.is_finite() && prev_error > 0.0 {
                (prev_error - current_error).abs() / prev_error
            } else {
                f32::INFINITY
            };

            if !changed || error_change < 1e-4 {
                converged = true;
                break;
            }

            prev_error = current_error;
        }

        let final_error = self.compute_error(training_data, &assignments);
        self.trained = true;

        Ok(TrainResult {
            iterations,
            converged,
            initial_error,
            final_error,
        })
    }

    fn initialize_centroids(&mut self, data: &EmbeddingMatrix) -> Vec<Vec<f32>> {
        let mut centroids = Vec::with_capacity(self.config.n_clusters);

        // Choose first centroid randomly
        let first_idx = self.rng.gen_range(0..data.rows());
        centroids.push(data.row(first_idx).to_vec());

        // Nearest squared distance from each point to the chosen centroids
        let mut distances: Vec<f32> = data
            .iter_rows()
            .map(|point| l2_squared(point, &centroids[0]))
            .collect();

        // Choose remaining centroids with probability proportional to squared distance
        while centroids.len() < self.config.n_clusters {
            let total: f32 = distances.iter().sum();
            let threshold = self.rng.gen::<f32>() * total;

            let mut chosen = data.rows() - 1;
            let mut cumulative = 0.0;
            for (j, d) in distances.iter().enumerate() {
                cumulative += d;
                if cumulative >= threshold && *d > 0.0 {
                    chosen = j;
                    break;
                }
            }

            let centroid = data.row(chosen).to_vec();
            for (d, point) in distances.iter_mut().zip(data.iter_rows()) {
                *d = d.min(l2_squared(point, &centroid));
            }
            centroids.push(centroid);
        }

        centroids
    }

    fn nearest_centroid_l2(&self, vector: &[f32]) -> ClusterId {
        let mut best_id = ClusterId(0);
        let mut best_dist = f32::INFINITY;

        for (i, centroid) in self.centroids.iter().enumerate() {
            let dist = l2_squared(vector, centroid);
            if dist < best_dist {
                best_dist = dist;
                best_id = ClusterId(i);
            }
        }

        best_id
    }

    /// Closest centroid under the index metric.
    pub(crate) fn find_nearest_centroid(&self, vector: &[f32]) -> ClusterId {
        self.probe_order(vector)
            .first()
            .map(|&(id, _)| id)
            .unwrap_or(ClusterId(0))
    }

    fn probe_order(&self, vector: &[f32]) -> Vec<(ClusterId, f32)> {
        let mut order: Vec<(ClusterId, f32)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (ClusterId(i), self.metric.distance(vector, c)))
            .collect();
        order.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        order
    }

    fn update_centroids(&mut self, data: &EmbeddingMatrix, assignments: &[ClusterId]) {
        let dim = self.dimension;
        let mut sums = vec![vec![0.0f32; dim]; self.config.n_clusters];
        let mut counts = vec![0usize; self.config.n_clusters];

        for (vector, &cluster_id) in data.iter_rows().zip(assignments) {
            for (s, v) in sums[cluster_id.0].iter_mut().zip(vector) {
                *s += v;
            }
            counts[cluster_id.0] += 1;
        }

        // Empty clusters keep their previous centroid
        for ((centroid, sum), count) in self.centroids.iter_mut().zip(sums).zip(counts) {
            if count > 0 {
                *centroid = sum.into_iter().map(|s| s / count as f32).collect();
            }
        }
    }

    fn compute_error(&self, data: &EmbeddingMatrix, assignments: &[ClusterId]) -> f32 {
        let total: f32 = data
            .iter_rows()
            .zip(assignments)
            .map(|(vector, &cluster_id)| l2_squared(vector, &self.centroids[cluster_id.0]))
            .sum();

        total / data.rows().max(1) as f32
    }

    /// Assigns `vector` to its closest cluster and returns its label.
    pub fn insert(&mut self, vector: &[f32]) -> Result<Label, IVFError> {
        if !self.trained {
            return Err(IVFError::NotTrained);
        }
        self.check_dimension(vector.len())?;

        let cluster_id = self.find_nearest_centroid(vector);
        let label = self.total_vectors as Label;

        let list = &mut self.inverted_lists[cluster_id.0];
        list.labels.push(label);
        list.vectors.extend_from_slice(vector);

        self.total_vectors += 1;
        Ok(label)
    }

    pub fn get_inverted_list(&self, cluster_id: ClusterId) -> Option<&InvertedList> {
        self.inverted_lists.get(cluster_id.0)
    }

    pub fn get_cluster_size(&self, cluster_id: ClusterId) -> usize {
        self.get_inverted_list(cluster_id)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>, IVFError> {
        self.search_with_config(query, k, self.config.n_probe)
    }

    pub fn search_with_config(
        &self,
        query: &[f32],
        k: usize,
        n_probe: usize,
    ) -> Result<Vec<SearchResult>, IVFError> {
        if !self.trained {
            return Err(IVFError::NotTrained);
        }
        self.check_dimension(query.len())?;

        let mut probes = self.probe_order(query);
        probes.truncate(n_probe);

        let mut candidates = Vec::new();
        for (cluster_id, _) in probes {
            let list = &self.inverted_lists[cluster_id.0];
            for (label, vector) in list
                .labels
                .iter()
                .zip(list.vectors.chunks_exact(self.dimension))
            {
                candidates.push((*label, self.metric.distance(query, vector)));
            }
        }

        Ok(into_results(closest_k(candidates, k), self.metric))
    }
}
