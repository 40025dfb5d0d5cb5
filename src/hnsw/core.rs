// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::types::{Label, Metric, SearchResult};
use crate::core::vector_ops::into_results;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HNSWError {
    #[error("Invalid dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HNSWConfig {
    /// Links per node on upper layers; layer 0 allows twice as many.
    pub max_connections: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    pub seed: Option<u64>,
}

impl Default for HNSWConfig {
    fn default() -> Self {
        Self {
            max_connections: 32,
            ef_construction: 40,
            ef_search: 16,
            seed: None,
        }
    }
}

impl HNSWConfig {
    pub fn max_connections_layer_0(&self) -> usize {
        self.max_connections * 2
    }

    pub fn is_valid(&self) -> bool {
        self.max_connections > 0 && self.ef_construction > 0 && self.ef_search > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HNSWNode {
    vector: Vec<f32>,
    level: usize,
    neighbors: Vec<Vec<usize>>, // neighbors[i] = neighbors at layer i
}

impl HNSWNode {
    pub fn new(vector: Vec<f32>, level: usize) -> Self {
        Self {
            vector,
            level,
            neighbors: vec![Vec::new(); level + 1],
        }
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn neighbors(&self, layer: usize) -> &[usize] {
        &self.neighbors[layer]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SearchCandidate {
    id: usize,
    distance: f32,
}

impl Eq for SearchCandidate {}

impl PartialOrd for SearchCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

fn fresh_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Hierarchical navigable small world graph over dense vectors. Node ids are
/// insertion positions and double as search labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HNSWIndex {
    config: HNSWConfig,
    metric: Metric,
    dimension: usize,
    nodes: Vec<HNSWNode>,
    entry_point: Option<usize>,
    #[serde(skip, default = "fresh_rng")]
    rng: StdRng,
}

impl HNSWIndex {
    pub fn new(dimension: usize, metric: Metric, config: HNSWConfig) -> Result<Self, HNSWError> {
        if !config.is_valid() {
            return Err(HNSWError::InvalidConfig(format!("{:?}", config)));
        }
        if dimension == 0 {
            return Err(HNSWError::InvalidConfig("dimension must be positive".into()));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            metric,
            dimension,
            nodes: Vec::new(),
            entry_point: None,
            rng,
        })
    }

    pub fn config(&self) -> &HNSWConfig {
        &self.config
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn entry_point(&self) -> Option<usize> {
        self.entry_point
    }

    pub fn get_node(&self, id: usize) -> Option<&HNSWNode> {
        self.nodes.get(id)
    }

    pub fn set_ef_search(&mut self, ef_search: usize) {
        self.config.ef_search = ef_search;
    }

    /// Draws a level with P(level >= l) = (1 / M)^l.
    pub fn assign_level(&mut self) -> usize {
        let p = 1.0 / self.config.max_connections.max(2) as f64;

        let mut level = 0;
        while self.rng.gen::<f64>() < p {
            level += 1;
        }

        level
    }

    fn max_links(&self, layer: usize) -> usize {
        if layer == 0 {
            self.config.max_connections_layer_0()
        } else {
            self.config.max_connections
        }
    }

    fn check_dimension(&self, len: usize) -> Result<(), HNSWError> {
        if len != self.dimension {
            return Err(HNSWError::DimensionMismatch {
                expected: self.dimension,
                actual: len,
            });
        }
        Ok(())
    }

    fn distance_to(&self, query: &[f32], id: usize) -> f32 {
        self.metric.distance(query, &self.nodes[id].vector)
    }

    /// Inserts a vector and returns its label.
    pub fn insert(&mut self, vector: Vec<f32>) -> Result<Label, HNSWError> {
        self.check_dimension(vector.len())?;

        let level = self.assign_level();
        let id = self.nodes.len();
        self.nodes.push(HNSWNode::new(vector, level));

        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => {
                self.entry_point = Some(id);
                return Ok(id as Label);
            }
        };

        let query = self.nodes[id].vector.clone();
        let top_level = self.nodes[entry_point].level;

        // Greedy descent through layers above the new node
        let mut current = SearchCandidate {
            id: entry_point,
            distance: self.distance_to(&query, entry_point),
        };
        for lc in ((level + 1)..=top_level).rev() {
            current = self.greedy_closest(&query, current, lc);
        }

        let mut entry_points = vec![current];
        for lc in (0..=level.min(top_level)).rev() {
            let candidates =
                self.search_layer(&query, &entry_points, self.config.ef_construction, lc);
            let neighbors: Vec<usize> = candidates
                .iter()
                .take(self.max_links(lc))
                .map(|c| c.id)
                .collect();

            self.nodes[id].neighbors[lc] = neighbors.clone();
            for neighbor in neighbors {
                self.nodes[neighbor].neighbors[lc].push(id);
                if self.nodes[neighbor].neighbors[lc].len() > self.max_links(lc) {
                    self.prune_neighbors(neighbor, lc);
                }
            }

            if !candidates.is_empty() {
                entry_points = candidates;
            }
        }

        if level > top_level {
            self.entry_point = Some(id);
        }

        Ok(id as Label)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>, HNSWError> {
        self.search_with_ef(query, k, self.config.ef_search)
    }

    pub fn search_with_ef(
        &self,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Result<Vec<SearchResult>, HNSWError> {
        self.check_dimension(query.len())?;

        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => return Ok(Vec::new()), // Empty index
        };

        let mut current = SearchCandidate {
            id: entry_point,
            distance: self.distance_to(query, entry_point),
        };
        for lc in (1..=self.nodes[entry_point].level).rev() {
            current = self.greedy_closest(query, current, lc);
        }

        let mut nearest = self.search_layer(query, &[current], ef.max(k), 0);
        nearest.truncate(k);

        let pairs = nearest
            .into_iter()
            .map(|c| (c.id as Label, c.distance))
            .collect();
        Ok(into_results(pairs, self.metric))
    }

    fn greedy_closest(
        &self,
        query: &[f32],
        start: SearchCandidate,
        layer: usize,
    ) -> SearchCandidate {
        let mut best = start;
        loop {
            let mut improved = false;
            for &neighbor in &self.nodes[best.id].neighbors[layer] {
                let distance = self.distance_to(query, neighbor);
                if distance < best.distance {
                    best = SearchCandidate {
                        id: neighbor,
                        distance,
                    };
                    improved = true;
                }
            }
            if !improved {
                return best;
            }
        }
    }

    /// Beam search restricted to one layer. Returns up to `ef` candidates,
    /// closest first.
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[SearchCandidate],
        ef: usize,
        layer: usize,
    ) -> Vec<SearchCandidate> {
        let mut visited = HashSet::new();
        let mut candidates = BinaryHeap::new();
        let mut nearest: BinaryHeap<SearchCandidate> = BinaryHeap::new();

        for &ep in entry_points {
            if visited.insert(ep.id) {
                candidates.push(Reverse(ep));
                nearest.push(ep);
            }
        }
        while nearest.len() > ef {
            nearest.pop();
        }

        while let Some(Reverse(current)) = candidates.pop() {
            let furthest = match nearest.peek() {
                Some(c) => c.distance,
                None => break,
            };
            if current.distance > furthest && nearest.len() >= ef {
                break;
            }

            let node = &self.nodes[current.id];
            if node.level < layer {
                continue;
            }

            for &neighbor in &node.neighbors[layer] {
                if !visited.insert(neighbor) {
                    continue;
                }

                let distance = self.distance_to(query, neighbor);
                let furthest = nearest.peek().map(|c| c.distance).unwrap_or(f32::INFINITY);
                if nearest.len() < ef || distance < furthest {
                    let candidate = SearchCandidate {
                        id: neighbor,
                        distance,
                    };
                    candidates.push(Reverse(candidate));
                    nearest.push(candidate);
                    if nearest.len() > ef {
                        nearest.pop();
                    }
                }
            }
        }

        nearest.into_sorted_vec()
    }

    /// Keeps only the closest links of `id` on `layer`.
    fn prune_neighbors(&mut self, id: usize, layer: usize) {
        let base = &self.nodes[id].vector;
        let mut candidates: Vec<SearchCandidate> = self.nodes[id].neighbors[layer]
            .iter()
            .map(|&n| SearchCandidate {
                id: n,
                distance: self.metric.distance(base, &self.nodes[n].vector),
            })
            .collect();

        candidates.sort();
        candidates.truncate(self.max_links(layer));
        self.nodes[id].neighbors[layer] = candidates.into_iter().map(|c| c.id).collect();
    }

    /// Get the maximum level across all nodes (number of layers - 1)
    pub fn get_max_level(&self) -> usize {
        self.nodes.iter().map(|node| node.level).max().unwrap_or(0)
    }

    /// Get the number of nodes at each level
    pub fn get_level_distribution(&self) -> Vec<usize> {
        let mut distribution = vec![0; self.get_max_level() + 1];
        for node in &self.nodes {
            for count in distribution.iter_mut().take(node.level + 1) {
                *count += 1;
            }
        }
        distribution
    }
}
