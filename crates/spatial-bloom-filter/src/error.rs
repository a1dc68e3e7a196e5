//! Error types for the Spatial Bloom Filter

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type SbfResult<T> = Result<T, SbfError>;

/// Errors that can occur while building, populating or querying a filter
#[derive(Debug, Error)]
pub enum SbfError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid area: {area} (must be between 1 and {num_areas})")]
    InvalidArea { area: u64, num_areas: u16 },

    #[error("Cell index out of range: {index} >= {num_cells}")]
    IndexOutOfRange { index: usize, num_cells: usize },

    #[error("Malformed input at record {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while validating construction parameters or the salt source
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bit mapping: {bit_mapping} (must be between 1 and {max})")]
    InvalidBitMapping { bit_mapping: u32, max: u32 },

    #[error("Hash family cannot be empty")]
    EmptyHashFamily,

    #[error("Too many hash functions: {count} > {max}")]
    TooManyHashes { count: usize, max: usize },

    #[error("Unsupported hash function: {0}")]
    UnsupportedHash(String),

    #[error("Invalid number of areas: {num_areas} (must be between 1 and {max})")]
    InvalidAreaCount { num_areas: u32, max: u32 },

    #[error("Invalid salt length: {length}")]
    InvalidSaltLength { length: usize },

    #[error("Salt file not found: {0:?}")]
    SaltFileMissing(PathBuf),

    #[error("Not enough salts: found {found}, required {required}")]
    InsufficientSalts { found: usize, required: usize },

    #[error("Invalid salt encoding at line {line}: {reason}")]
    InvalidSaltEncoding { line: usize, reason: String },

    #[error("Inconsistent filter state: {0}")]
    InconsistentState(String),
}

impl SbfError {
    /// Build a `MalformedInput` error for a 1-based record number
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        SbfError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the configuration kind
    pub fn is_configuration(&self) -> bool {
        matches!(self, SbfError::Configuration(_))
    }
}

impl From<csv::Error> for SbfError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|pos| pos.record() as usize + 1)
            .unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(io) => SbfError::Io(io),
            kind => SbfError::malformed(line, format!("{kind:?}")),
        }
    }
}
