// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod core;
pub mod operations;

pub use self::core::{HNSWConfig, HNSWError, HNSWIndex, HNSWNode};
pub use self::operations::GraphStats;
