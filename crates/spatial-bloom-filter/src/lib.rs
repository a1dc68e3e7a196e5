//! # Spatial Bloom Filter
//!
//! A probabilistic structure that maps elements to one of several disjoint
//! areas. Cells hold area labels instead of bits, so a query answers both
//! "is this a member" and "which area does it belong to".
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `SpatialBloomFilter`: Cells, counters and the collision policy
//!   - `SbfConfig`: Configuration with validation
//!   - `SbfConfigBuilder`: Fluent builder for configuration
//!   - `Statistics`: Sparsity, false positive and emersion estimators
//!   - `FilterSnapshot`: Serializable filter state
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `SpatialFilterApi`: Driving port for presentation layers
//!   - `SaltSource`, `RecordSource`: Driven ports for salts and datasets
//!
//! - **Adapters Layer** (`adapters/`): External connections
//!   - `FileSaltStore`: Base64 salt file
//!   - `CsvRecordSource`: Delimited dataset reader
//!   - `save_report`: `;`-delimited report export
//!
//! ## Invariants
//!
//! - Inserting areas in ascending order leaves every element's minimum probe
//!   at its own area or higher
//! - An inserted element is never reported with area 0
//!
//! ## Usage Example
//!
//! ```ignore
//! use spatial_bloom_filter::{SbfConfigBuilder, SpatialBloomFilter, StaticSalts};
//!
//! let config = SbfConfigBuilder::new()
//!     .bit_mapping(10)
//!     .hash_family(["md5", "sha1", "sha256"])
//!     .num_areas(2)
//!     .build()?;
//!
//! let mut filter = SpatialBloomFilter::new(&config, &StaticSalts::generated(3, 32))?;
//! filter.insert(b"51.8989#-8.4825", 1)?;
//! filter.insert(b"51.9000#-8.5000", 2)?;
//!
//! assert_eq!(filter.check_area(b"51.9000#-8.5000"), 2);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use adapters::{
    save_report, write_report, CsvRecordSource, FileSaltStore, ReportMode, StaticSalts,
    DEFAULT_DELIMITER,
};
pub use domain::{
    AreaStatistics, CellArray, CheckResult, CheckSummary, FilterSnapshot, HashAlgorithm,
    HashProbe, InsertSummary, Mismatch, SaltPolicy, SbfConfig, SbfConfigBuilder,
    SpatialBloomFilter, Statistics, StatisticsReport,
};
pub use error::{ConfigError, SbfError, SbfResult};
pub use ports::{Record, RecordSource, SaltSource, SpatialFilterApi};
