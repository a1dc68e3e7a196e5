//! Inbound Ports (Driving Ports)
//!
//! The surface presentation layers use: populate, query, render and reset a
//! filter without re-deriving indices themselves.

use crate::domain::{CheckResult, SpatialBloomFilter, StatisticsReport};
use crate::error::SbfResult;
use crate::ports::RecordSource;

/// Primary spatial Bloom filter API (Driving Port)
pub trait SpatialFilterApi {
    /// Map an element to an area
    fn insert(&mut self, element: &[u8], area: u16) -> SbfResult<()>;

    /// Map every `(area, element)` record of a source
    fn insert_from_source(&mut self, source: &mut dyn RecordSource) -> SbfResult<usize>;

    /// Per-hash `(index, area)` probes for an element
    fn check(&self, element: &[u8]) -> CheckResult;

    /// Raw cell values, for rendering
    fn cells(&self) -> Vec<u16>;

    /// Every estimator, ready for display
    fn stats(&self) -> StatisticsReport;

    /// Reset cells and counters
    fn clear(&mut self);
}

impl SpatialFilterApi for SpatialBloomFilter {
    fn insert(&mut self, element: &[u8], area: u16) -> SbfResult<()> {
        SpatialBloomFilter::insert(self, element, area)
    }

    fn insert_from_source(&mut self, source: &mut dyn RecordSource) -> SbfResult<usize> {
        SpatialBloomFilter::insert_from_source(self, source).map(|summary| summary.inserted)
    }

    fn check(&self, element: &[u8]) -> CheckResult {
        SpatialBloomFilter::check(self, element)
    }

    fn cells(&self) -> Vec<u16> {
        SpatialBloomFilter::cells(self)
    }

    fn stats(&self) -> StatisticsReport {
        self.statistics().snapshot()
    }

    fn clear(&mut self) {
        SpatialBloomFilter::clear(self)
    }
}
