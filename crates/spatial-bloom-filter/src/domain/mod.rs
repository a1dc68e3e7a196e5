//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Configuration and parameter bounds
//! - Salted digest indexing
//! - Cell storage
//! - The spatial Bloom filter engine and its collision policy
//! - Statistical estimators
//! - Serializable snapshots
//!
//! RULES:
//! - No I/O here; salts and dataset records arrive through `ports`

pub mod cells;
pub mod check;
pub mod config;
pub mod hash_functions;
pub mod snapshot;
pub mod spatial_filter;
pub mod statistics;

pub use cells::CellArray;
pub use check::{CheckResult, CheckSummary, HashProbe, InsertSummary, Mismatch};
pub use config::{
    SaltPolicy, SbfConfig, SbfConfigBuilder, DEFAULT_SALT_PATH, MAX_AREA_NUMBER, MAX_BIT_MAPPING,
    MAX_HASH_NUMBER, MAX_INPUT_SIZE,
};
pub use hash_functions::HashAlgorithm;
pub use snapshot::FilterSnapshot;
pub use spatial_filter::SpatialBloomFilter;
pub use statistics::{AreaStatistics, Statistics, StatisticsReport, UNDEFINED_EMERSION};
