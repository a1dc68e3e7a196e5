//! Core Spatial Bloom Filter implementation
//!
//! INVARIANTS:
//! - A cell holds 0 until written, and `clear()` returns every cell to 0
//! - `sum(area_cells) <= num_cells`
//! - `members == sum(area_members)`
//! - Inserted in ascending area order, a cell's label never decreases

use std::fmt;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::cells::CellArray;
use super::check::{CheckResult, CheckSummary, HashProbe, InsertSummary, Mismatch};
use super::config::SbfConfig;
use super::hash_functions::{compute_digest_indices, HashAlgorithm};
use super::snapshot::FilterSnapshot;
use crate::error::{ConfigError, SbfError, SbfResult};
use crate::ports::{Record, RecordSource, SaltSource};

/// Spatial Bloom filter mapping elements to ordered area labels
///
/// Elements are inserted with an area in `1..=num_areas`. A query returns
/// the smallest label found across the element's cells, or 0 when any of
/// them is empty.
///
/// The filter is not synchronized: mutation requires `&mut self`, and
/// sharing across threads needs an external lock.
#[derive(Clone)]
pub struct SpatialBloomFilter {
    pub(crate) bit_mapping: u32,
    pub(crate) hash_family: Vec<HashAlgorithm>,
    pub(crate) num_areas: u16,
    salts: Vec<Vec<u8>>,
    pub(crate) cells: CellArray,
    pub(crate) members: u64,
    pub(crate) collisions: u64,
    /// Indexed by area; slot 0 is unused
    pub(crate) area_members: Vec<u64>,
    pub(crate) area_cells: Vec<u64>,
    pub(crate) area_self_collisions: Vec<u64>,
}

impl fmt::Debug for SpatialBloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialBloomFilter")
            .field("bit_mapping", &self.bit_mapping)
            .field("hash_family", &self.hash_family)
            .field("num_areas", &self.num_areas)
            .field("members", &self.members)
            .field("collisions", &self.collisions)
            .finish_non_exhaustive()
    }
}

impl SpatialBloomFilter {
    /// Create a filter, drawing one salt per hash function from `salt_source`
    ///
    /// Fails with a configuration error when a parameter is out of bounds
    /// or the source cannot provide enough salts.
    pub fn new(config: &SbfConfig, salt_source: &dyn SaltSource) -> SbfResult<Self> {
        config.validate()?;
        let hash_family = config.hash_algorithms()?;
        let salts = Self::take_salts(salt_source, hash_family.len())?;
        let num_areas = config.num_areas as u16;
        let num_cells = config.num_cells();

        info!(
            bit_mapping = config.bit_mapping,
            num_cells,
            num_areas,
            hash_family = ?hash_family,
            "Spatial Bloom filter created"
        );

        Ok(Self {
            bit_mapping: config.bit_mapping,
            hash_family,
            num_areas,
            salts,
            cells: CellArray::new(num_cells, num_areas),
            members: 0,
            collisions: 0,
            area_members: vec![0; num_areas as usize + 1],
            area_cells: vec![0; num_areas as usize + 1],
            area_self_collisions: vec![0; num_areas as usize + 1],
        })
    }

    /// Rebuild a filter from a snapshot, reloading salts from `salt_source`
    pub fn restore(snapshot: FilterSnapshot, salt_source: &dyn SaltSource) -> SbfResult<Self> {
        snapshot.verify()?;
        let salts = Self::take_salts(salt_source, snapshot.hash_family.len())?;

        debug!(members = snapshot.members, "Spatial Bloom filter restored");

        Ok(Self {
            bit_mapping: snapshot.bit_mapping,
            hash_family: snapshot.hash_family,
            num_areas: snapshot.num_areas,
            salts,
            cells: snapshot.cells,
            members: snapshot.members,
            collisions: snapshot.collisions,
            area_members: snapshot.area_members,
            area_cells: snapshot.area_cells,
            area_self_collisions: snapshot.area_self_collisions,
        })
    }

    /// Capture cells and counters; salts are never included
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            bit_mapping: self.bit_mapping,
            hash_family: self.hash_family.clone(),
            num_areas: self.num_areas,
            cells: self.cells.clone(),
            members: self.members,
            collisions: self.collisions,
            area_members: self.area_members.clone(),
            area_cells: self.area_cells.clone(),
            area_self_collisions: self.area_self_collisions.clone(),
        }
    }

    fn take_salts(salt_source: &dyn SaltSource, required: usize) -> SbfResult<Vec<Vec<u8>>> {
        let mut salts = salt_source.salts(required)?;
        if salts.len() < required {
            return Err(ConfigError::InsufficientSalts {
                found: salts.len(),
                required,
            }
            .into());
        }
        salts.truncate(required);
        Ok(salts)
    }

    fn validate_area(&self, area: u64) -> SbfResult<u16> {
        if area == 0 || area > u64::from(self.num_areas) {
            return Err(SbfError::InvalidArea {
                area,
                num_areas: self.num_areas,
            });
        }
        Ok(area as u16)
    }

    /// Digest index set of an element, one index per hash function
    pub fn digest_indices(&self, element: &[u8]) -> Vec<usize> {
        compute_digest_indices(&self.hash_family, &self.salts, element, self.bit_mapping)
    }

    /// Map an element to an area
    ///
    /// Elements MUST be inserted in ascending area order for the
    /// self-collision counters to stay accurate.
    pub fn insert(&mut self, element: &[u8], area: u16) -> SbfResult<()> {
        let area = self.validate_area(u64::from(area))?;
        for index in self.digest_indices(element) {
            self.apply_collision_policy(index, area);
        }
        self.members += 1;
        self.area_members[area as usize] += 1;
        Ok(())
    }

    /// Write an area label into one cell, applying the collision policy
    ///
    /// Only cell, collision and area-cell counters change; member counters
    /// are left to `insert`.
    pub fn set_cell(&mut self, index: usize, area: u16) -> SbfResult<()> {
        let area = self.validate_area(u64::from(area))?;
        if index >= self.cells.len() {
            return Err(SbfError::IndexOutOfRange {
                index,
                num_cells: self.cells.len(),
            });
        }
        self.apply_collision_policy(index, area);
        Ok(())
    }

    fn apply_collision_policy(&mut self, index: usize, area: u16) {
        let current = self.cells.get(index);
        if current == 0 {
            self.cells.set(index, area);
            self.area_cells[area as usize] += 1;
        } else if current < area {
            self.cells.set(index, area);
            self.collisions += 1;
            self.area_cells[area as usize] += 1;
            self.area_cells[current as usize] -= 1;
        } else if current == area {
            self.collisions += 1;
            self.area_self_collisions[area as usize] += 1;
        } else {
            // Unreachable under ascending insertion; the self-collision
            // count of `current` may now be off.
            self.collisions += 1;
            warn!(index, current, area, "Cell already holds a higher area");
        }
    }

    /// Probe an element's cells
    pub fn check(&self, element: &[u8]) -> CheckResult {
        let probes = self
            .hash_family
            .iter()
            .zip(self.digest_indices(element))
            .map(|(&algorithm, index)| HashProbe {
                algorithm,
                index,
                area: self.cells.get(index),
            })
            .collect();
        CheckResult::new(probes)
    }

    /// The area an element belongs to, or 0 if it is not a member
    pub fn check_area(&self, element: &[u8]) -> u16 {
        self.check(element).area()
    }

    /// Insert every `(area, element)` record of a source
    ///
    /// The whole source is validated before the first insert, so a bad
    /// record leaves the filter untouched.
    pub fn insert_from_source(&mut self, source: &mut dyn RecordSource) -> SbfResult<InsertSummary> {
        let start = Instant::now();
        let records = source.read_records()?;

        let mut parsed = Vec::with_capacity(records.len());
        for record in &records {
            if record.width() != 2 {
                return Err(SbfError::malformed(
                    record.line,
                    format!("expected 2 fields (area, element), found {}", record.width()),
                ));
            }
            let area = self.validate_area(parse_area(record, &record.fields[0])?)?;
            parsed.push((record.line, area, record.fields[1].as_slice()));
        }

        let mut summary = InsertSummary::default();
        let mut previous = 0u16;
        for (line, area, element) in parsed {
            if area < previous {
                if summary.out_of_order == 0 {
                    warn!(
                        line,
                        area, previous, "Records are not in ascending area order"
                    );
                }
                summary.out_of_order += 1;
            }
            previous = area;
            self.insert(element, area)?;
            summary.inserted += 1;
        }

        info!(
            inserted = summary.inserted,
            out_of_order = summary.out_of_order,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bulk insert complete"
        );
        Ok(summary)
    }

    /// Check every record of a source
    ///
    /// One-field records (`element`) produce a histogram of reported areas;
    /// two-field records (`expected_area, element`) are compared against the
    /// filter. Mixing widths, or any other width, is malformed input.
    pub fn check_from_source(&self, source: &mut dyn RecordSource) -> SbfResult<CheckSummary> {
        let start = Instant::now();
        let records = source.read_records()?;
        let slots = self.num_areas as usize + 1;

        let width = records.first().map(Record::width).unwrap_or(1);
        if width != 1 && width != 2 {
            return Err(SbfError::malformed(
                records[0].line,
                format!("expected 1 or 2 fields, found {}", width),
            ));
        }
        if let Some(record) = records.iter().find(|r| r.width() != width) {
            return Err(SbfError::malformed(
                record.line,
                format!("expected {} fields, found {}", width, record.width()),
            ));
        }

        let summary = if width == 1 {
            let mut histogram = vec![0u64; slots];
            for record in &records {
                histogram[self.check_area(&record.fields[0]) as usize] += 1;
            }
            CheckSummary::Membership { histogram }
        } else {
            let mut expectations = Vec::with_capacity(records.len());
            for record in &records {
                let expected = parse_area(record, &record.fields[0])?;
                if expected > u64::from(self.num_areas) {
                    return Err(SbfError::malformed(
                        record.line,
                        format!("expected area {} exceeds {}", expected, self.num_areas),
                    ));
                }
                expectations.push(expected as u16);
            }

            let mut correct = vec![0u64; slots];
            let mut incorrect = vec![0u64; slots];
            let mut mismatches = Vec::new();
            for (record, expected) in records.iter().zip(expectations) {
                let found = self.check_area(&record.fields[1]);
                if found == expected {
                    correct[expected as usize] += 1;
                } else {
                    incorrect[expected as usize] += 1;
                    mismatches.push(Mismatch {
                        line: record.line,
                        element: String::from_utf8_lossy(&record.fields[1]).into_owned(),
                        expected,
                        found,
                    });
                }
            }
            CheckSummary::Verification {
                correct,
                incorrect,
                mismatches,
            }
        };

        info!(
            checked = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bulk check complete"
        );
        Ok(summary)
    }

    /// Reset cells and counters; configuration and salts are kept
    pub fn clear(&mut self) {
        self.cells.clear();
        self.members = 0;
        self.collisions = 0;
        self.area_members.fill(0);
        self.area_cells.fill(0);
        self.area_self_collisions.fill(0);
        debug!("Spatial Bloom filter cleared");
    }

    /// Copy of every cell value
    pub fn cells(&self) -> Vec<u16> {
        self.cells.to_vec()
    }

    /// Value of a single cell
    pub fn cell(&self, index: usize) -> Option<u16> {
        (index < self.cells.len()).then(|| self.cells.get(index))
    }

    pub fn bit_mapping(&self) -> u32 {
        self.bit_mapping
    }

    pub fn hash_family(&self) -> &[HashAlgorithm] {
        &self.hash_family
    }

    /// Number of hash functions
    pub fn hash_count(&self) -> usize {
        self.hash_family.len()
    }

    pub fn num_areas(&self) -> u16 {
        self.num_areas
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Width of a cell in bytes
    pub fn cell_size(&self) -> usize {
        self.cells.cell_size()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.cell_size() * self.num_cells()
    }

    /// Total elements inserted
    pub fn members(&self) -> u64 {
        self.members
    }

    /// Total cell overwrites and rehashes
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Elements inserted with `area`. Panics if `area > num_areas`.
    pub fn area_members(&self, area: u16) -> u64 {
        self.area_members[area as usize]
    }

    /// Cells currently labelled `area`. Panics if `area > num_areas`.
    pub fn area_cells(&self, area: u16) -> u64 {
        self.area_cells[area as usize]
    }

    /// Probes of `area` that landed on a cell already labelled `area`
    pub fn area_self_collisions(&self, area: u16) -> u64 {
        self.area_self_collisions[area as usize]
    }
}

fn parse_area(record: &Record, field: &[u8]) -> SbfResult<u64> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            SbfError::malformed(
                record.line,
                format!("area {:?} is not a non-negative integer", String::from_utf8_lossy(field)),
            )
        })
}
