//! Serializable filter state
//!
//! A snapshot holds configuration, cells and counters so a populated filter
//! can be stored and restored. Salts are deliberately absent and must be
//! supplied again on restore.

use serde::{Deserialize, Serialize};

use super::cells::CellArray;
use super::config::{cell_count, MAX_AREA_NUMBER, MAX_BIT_MAPPING, MAX_HASH_NUMBER};
use super::hash_functions::HashAlgorithm;
use crate::error::{ConfigError, SbfError, SbfResult};

/// Point-in-time copy of a filter's cells and counters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub bit_mapping: u32,
    pub hash_family: Vec<HashAlgorithm>,
    pub num_areas: u16,
    pub cells: CellArray,
    pub members: u64,
    pub collisions: u64,
    pub area_members: Vec<u64>,
    pub area_cells: Vec<u64>,
    pub area_self_collisions: Vec<u64>,
}

impl FilterSnapshot {
    /// Serialize the snapshot to bytes
    pub fn to_bytes(&self) -> SbfResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| SbfError::Serialization(e.to_string()))
    }

    /// Deserialize a snapshot from bytes
    pub fn from_bytes(bytes: &[u8]) -> SbfResult<Self> {
        bincode::deserialize(bytes).map_err(|e| SbfError::Serialization(e.to_string()))
    }

    /// Check that the snapshot describes a reachable filter state
    pub fn verify(&self) -> SbfResult<()> {
        if self.bit_mapping == 0 || self.bit_mapping > MAX_BIT_MAPPING {
            return Err(ConfigError::InvalidBitMapping {
                bit_mapping: self.bit_mapping,
                max: MAX_BIT_MAPPING,
            }
            .into());
        }
        if self.num_areas == 0 || u32::from(self.num_areas) > MAX_AREA_NUMBER {
            return Err(ConfigError::InvalidAreaCount {
                num_areas: u32::from(self.num_areas),
                max: MAX_AREA_NUMBER,
            }
            .into());
        }
        if self.hash_family.is_empty() {
            return Err(ConfigError::EmptyHashFamily.into());
        }
        if self.hash_family.len() > MAX_HASH_NUMBER {
            return Err(ConfigError::TooManyHashes {
                count: self.hash_family.len(),
                max: MAX_HASH_NUMBER,
            }
            .into());
        }

        let num_cells = cell_count(self.bit_mapping).ok_or(ConfigError::InvalidBitMapping {
            bit_mapping: self.bit_mapping,
            max: usize::BITS - 1,
        })?;
        if self.cells.len() != num_cells {
            return Err(inconsistent(format!(
                "{} cells, expected {}",
                self.cells.len(),
                num_cells
            )));
        }
        if self.cells.cell_size() != CellArray::new(0, self.num_areas).cell_size() {
            return Err(inconsistent("cell width does not match area count"));
        }

        let slots = self.num_areas as usize + 1;
        for (name, counters) in [
            ("area_members", &self.area_members),
            ("area_cells", &self.area_cells),
            ("area_self_collisions", &self.area_self_collisions),
        ] {
            if counters.len() != slots {
                return Err(inconsistent(format!(
                    "{} has {} slots, expected {}",
                    name,
                    counters.len(),
                    slots
                )));
            }
        }

        if self.area_members.iter().sum::<u64>() != self.members {
            return Err(inconsistent("members differ from per-area members"));
        }

        let mut observed = vec![0u64; slots];
        for cell in self.cells.iter() {
            match observed.get_mut(cell as usize) {
                Some(count) => *count += 1,
                None => return Err(inconsistent(format!("cell holds unknown area {}", cell))),
            }
        }
        if observed[1..] != self.area_cells[1..] {
            return Err(inconsistent("area cell counters differ from cell contents"));
        }

        Ok(())
    }
}

fn inconsistent(reason: impl Into<String>) -> SbfError {
    ConfigError::InconsistentState(reason.into()).into()
}
