//! Cell storage for area labels
//!
//! Cells are one byte wide when every area label fits in a `u8`, two bytes
//! otherwise. A value of 0 marks an empty cell.

use serde::{Deserialize, Serialize};

/// Fixed-length array of area labels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellArray {
    Narrow(Vec<u8>),
    Wide(Vec<u16>),
}

impl CellArray {
    /// Allocate `len` empty cells wide enough to hold `num_areas`
    pub fn new(len: usize, num_areas: u16) -> Self {
        if num_areas <= u8::MAX as u16 {
            CellArray::Narrow(vec![0; len])
        } else {
            CellArray::Wide(vec![0; len])
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        match self {
            CellArray::Narrow(cells) => cells.len(),
            CellArray::Wide(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of a single cell in bytes
    pub fn cell_size(&self) -> usize {
        match self {
            CellArray::Narrow(_) => 1,
            CellArray::Wide(_) => 2,
        }
    }

    /// Read a cell. Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> u16 {
        match self {
            CellArray::Narrow(cells) => u16::from(cells[index]),
            CellArray::Wide(cells) => cells[index],
        }
    }

    /// Write a cell. The caller guarantees `area` fits the cell width.
    pub fn set(&mut self, index: usize, area: u16) {
        match self {
            CellArray::Narrow(cells) => cells[index] = area as u8,
            CellArray::Wide(cells) => cells[index] = area,
        }
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        match self {
            CellArray::Narrow(cells) => cells.fill(0),
            CellArray::Wide(cells) => cells.fill(0),
        }
    }

    /// Iterate over cell values
    pub fn iter(&self) -> Box<dyn Iterator<Item = u16> + '_> {
        match self {
            CellArray::Narrow(cells) => Box::new(cells.iter().map(|&c| u16::from(c))),
            CellArray::Wide(cells) => Box::new(cells.iter().copied()),
        }
    }

    /// Copy all cell values out
    pub fn to_vec(&self) -> Vec<u16> {
        self.iter().collect()
    }

    /// Number of non-empty cells
    pub fn occupied(&self) -> usize {
        self.iter().filter(|&c| c != 0).count()
    }
}
