//! Outbound Ports (Driven Ports)
//!
//! These traits define the inputs the engine needs from the outside world:
//! salt material at construction time and dataset records for bulk
//! operations.

use crate::error::SbfResult;

/// Supplies the salts XORed into elements before hashing
pub trait SaltSource {
    /// Return at least `count` salts, in hash-family order
    ///
    /// Implementations fail with `ConfigError::InsufficientSalts` when they
    /// cannot provide enough of them.
    fn salts(&self, count: usize) -> SbfResult<Vec<Vec<u8>>>;
}

/// A single delimited dataset record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 1-based record number within the source
    pub line: usize,
    /// Raw field values
    pub fields: Vec<Vec<u8>>,
}

impl Record {
    pub fn new(line: usize, fields: Vec<Vec<u8>>) -> Self {
        Self { line, fields }
    }

    /// Build a record from string fields
    pub fn from_strs(line: usize, fields: &[&str]) -> Self {
        Self::new(line, fields.iter().map(|f| f.as_bytes().to_vec()).collect())
    }

    /// Number of fields
    pub fn width(&self) -> usize {
        self.fields.len()
    }
}

/// Supplies dataset records for bulk insert and check
pub trait RecordSource {
    /// Read every remaining record
    fn read_records(&mut self) -> SbfResult<Vec<Record>>;
}

impl RecordSource for Vec<Record> {
    fn read_records(&mut self) -> SbfResult<Vec<Record>> {
        Ok(std::mem::take(self))
    }
}
