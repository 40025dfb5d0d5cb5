pub mod core;
pub mod operations;

pub use self::core::{ClusterId, IVFConfig, IVFError, IVFIndex, InvertedList, TrainResult};

pub use self::operations::ClusterStats;
