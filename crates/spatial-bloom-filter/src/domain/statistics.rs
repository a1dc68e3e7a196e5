//! Statistical analysis of a spatial Bloom filter
//!
//! With `m` cells, `k` hash functions, `n_i` members and `c_i` cells of
//! area `i`:
//!
//! - sparsity             = 1 - sum(c) / m
//! - fpp                  = (sum(c) / m)^k
//! - a-priori fpp         = (1 - (1 - 1/m)^(k*n))^k
//! - expected cells(i)    = m * (1 - (1 - 1/m)^(k*n_i)) * (1 - 1/m)^(k*sum(n_j, j > i))
//! - emersion(i)          = c_i / (k*n_i - self_collisions_i)
//! - expected emersion(i) = (1 - 1/m)^(k*sum(n_j, j > i))
//! - isep(i)              = (1 - emersion(i))^k
//! - a-priori isep(i)     = (1 - expected emersion(i))^k
//! - safeness             = prod((1 - a-priori isep(i))^n_i)
//!
//! Area-specific false positive probabilities are built from area
//! `num_areas` down to 1: the cumulative probability for areas `>= i`
//! minus the already computed values of every area above `i`, floored at 0.

use serde::{Deserialize, Serialize};

use super::spatial_filter::SpatialBloomFilter;

/// Emersion returned for an area with no members
pub const UNDEFINED_EMERSION: f64 = -1.0;

/// Read-only view computing estimators from a filter's counters
#[derive(Clone, Copy, Debug)]
pub struct Statistics<'a> {
    filter: &'a SpatialBloomFilter,
}

impl SpatialBloomFilter {
    /// Statistics over the current filter state
    pub fn statistics(&self) -> Statistics<'_> {
        Statistics { filter: self }
    }
}

impl<'a> Statistics<'a> {
    fn cells(&self) -> f64 {
        self.filter.num_cells() as f64
    }

    fn hashes(&self) -> f64 {
        self.filter.hash_count() as f64
    }

    fn areas(&self) -> impl DoubleEndedIterator<Item = u16> {
        1..=self.filter.num_areas()
    }

    /// Probability that a given cell is untouched by one probe
    fn miss(&self) -> f64 {
        1.0 - 1.0 / self.cells()
    }

    /// Members of every area strictly above `area`
    fn members_above(&self, area: u16) -> u64 {
        self.areas()
            .skip(area as usize)
            .map(|a| self.filter.area_members(a))
            .sum()
    }

    fn occupied(&self) -> u64 {
        self.areas().map(|a| self.filter.area_cells(a)).sum()
    }

    /// Fraction of empty cells
    pub fn filter_sparsity(&self) -> f64 {
        1.0 - self.occupied() as f64 / self.cells()
    }

    /// A-posteriori false positive probability
    pub fn filter_fpp(&self) -> f64 {
        (self.occupied() as f64 / self.cells()).powf(self.hashes())
    }

    /// A-priori false positive probability from the member count
    pub fn filter_apriori_fpp(&self) -> f64 {
        let filled = 1.0 - self.miss().powf(self.hashes() * self.filter.members() as f64);
        filled.powf(self.hashes())
    }

    /// A-posteriori false positive probability of every area
    ///
    /// Index 0 is unused.
    pub fn area_fpp_all(&self) -> Vec<f64> {
        self.descending_fpp(
            |area| self.filter.area_cells(area),
            |cumulative| (cumulative as f64 / self.cells()).powf(self.hashes()),
        )
    }

    /// A-priori false positive probability of every area
    ///
    /// Index 0 is unused.
    pub fn area_apriori_fpp_all(&self) -> Vec<f64> {
        self.descending_fpp(
            |area| self.filter.area_members(area),
            |cumulative| {
                let filled = 1.0 - self.miss().powf(self.hashes() * cumulative as f64);
                filled.powf(self.hashes())
            },
        )
    }

    fn descending_fpp(
        &self,
        count: impl Fn(u16) -> u64,
        probability: impl Fn(u64) -> f64,
    ) -> Vec<f64> {
        let num_areas = self.filter.num_areas() as usize;
        let mut fpp = vec![0.0; num_areas + 1];
        let mut cumulative = 0u64;
        for i in (1..=num_areas).rev() {
            cumulative += count(i as u16);
            let mut p = probability(cumulative);
            for j in i..num_areas {
                p -= fpp[j + 1];
            }
            fpp[i] = p.max(0.0);
        }
        fpp
    }

    /// A-posteriori false positive probability of one area
    ///
    /// Computes every area; use `area_fpp_all` when several are needed.
    /// Returns `None` if `area` is 0 or above `num_areas`.
    pub fn area_fpp(&self, area: u16) -> Option<f64> {
        self.valid_area(area).then(|| self.area_fpp_all()[area as usize])
    }

    /// A-priori false positive probability of one area
    ///
    /// Computes every area; use `area_apriori_fpp_all` when several are needed.
    /// Returns `None` if `area` is 0 or above `num_areas`.
    pub fn area_apriori_fpp(&self, area: u16) -> Option<f64> {
        self.valid_area(area)
            .then(|| self.area_apriori_fpp_all()[area as usize])
    }

    fn valid_area(&self, area: u16) -> bool {
        (1..=self.filter.num_areas()).contains(&area)
    }

    /// Expected number of cells labelled `area` after all insertions
    pub fn area_expected_cells(&self, area: u16) -> f64 {
        let k = self.hashes();
        let claimed = 1.0 - self.miss().powf(k * self.filter.area_members(area) as f64);
        let kept = self.miss().powf(k * self.members_above(area) as f64);
        self.cells() * claimed * kept
    }

    /// Fraction of an area's own probes still visible in the filter
    ///
    /// Returns `UNDEFINED_EMERSION` when the area has no members.
    pub fn area_emersion(&self, area: u16) -> f64 {
        let members = self.filter.area_members(area);
        if members == 0 {
            return UNDEFINED_EMERSION;
        }
        let probes = members as f64 * self.hashes()
            - self.filter.area_self_collisions(area) as f64;
        if probes <= 0.0 {
            return UNDEFINED_EMERSION;
        }
        self.filter.area_cells(area) as f64 / probes
    }

    /// Probability that a cell of `area` survives later, broader insertions
    pub fn area_expected_emersion(&self, area: u16) -> f64 {
        self.miss()
            .powf(self.hashes() * self.members_above(area) as f64)
    }

    /// A-posteriori inter-set error probability; 0 for an empty area
    pub fn area_isep(&self, area: u16) -> f64 {
        let emersion = self.area_emersion(area);
        if emersion < 0.0 {
            return 0.0;
        }
        (1.0 - emersion).max(0.0).powf(self.hashes())
    }

    /// A-priori inter-set error probability
    pub fn area_apriori_isep(&self, area: u16) -> f64 {
        (1.0 - self.area_expected_emersion(area)).powf(self.hashes())
    }

    /// Expected number of members of `area` suffering an inter-set error
    pub fn area_expected_ise(&self, area: u16) -> f64 {
        self.area_apriori_isep(area) * self.filter.area_members(area) as f64
    }

    /// Probability that no element in the filter suffers an inter-set error
    pub fn apriori_safeness(&self) -> f64 {
        self.areas()
            .rev()
            .map(|a| {
                (1.0 - self.area_apriori_isep(a)).powf(self.filter.area_members(a) as f64)
            })
            .product()
    }

    /// Compute every estimator into an owned report
    pub fn snapshot(&self) -> StatisticsReport {
        let fpp = self.area_fpp_all();
        let apriori_fpp = self.area_apriori_fpp_all();
        let filter = self.filter;

        let areas = self
            .areas()
            .map(|a| AreaStatistics {
                area: a,
                members: filter.area_members(a),
                expected_cells: self.area_expected_cells(a),
                self_collisions: filter.area_self_collisions(a),
                cells: filter.area_cells(a),
                expected_emersion: self.area_expected_emersion(a),
                emersion: self.area_emersion(a),
                apriori_fpp: apriori_fpp[a as usize],
                fpp: fpp[a as usize],
                apriori_isep: self.area_apriori_isep(a),
                expected_ise: self.area_expected_ise(a),
                isep: self.area_isep(a),
            })
            .collect();

        StatisticsReport {
            hash_family: filter.hash_family().iter().map(|h| h.name().to_string()).collect(),
            hash_count: filter.hash_count(),
            num_areas: filter.num_areas(),
            bit_mapping: filter.bit_mapping(),
            num_cells: filter.num_cells(),
            cell_size: filter.cell_size(),
            size_in_bytes: filter.size_in_bytes(),
            members: filter.members(),
            collisions: filter.collisions(),
            sparsity: self.filter_sparsity(),
            apriori_fpp: self.filter_apriori_fpp(),
            fpp: self.filter_fpp(),
            apriori_safeness: self.apriori_safeness(),
            areas,
        }
    }
}

/// Filter configuration and every estimator, computed at one point in time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub hash_family: Vec<String>,
    pub hash_count: usize,
    pub num_areas: u16,
    pub bit_mapping: u32,
    pub num_cells: usize,
    pub cell_size: usize,
    pub size_in_bytes: usize,
    pub members: u64,
    pub collisions: u64,
    pub sparsity: f64,
    pub apriori_fpp: f64,
    pub fpp: f64,
    pub apriori_safeness: f64,
    /// One row per area, ascending
    pub areas: Vec<AreaStatistics>,
}

/// Per-area estimators
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaStatistics {
    pub area: u16,
    pub members: u64,
    pub expected_cells: f64,
    pub self_collisions: u64,
    pub cells: u64,
    pub expected_emersion: f64,
    pub emersion: f64,
    pub apriori_fpp: f64,
    pub fpp: f64,
    pub apriori_isep: f64,
    pub expected_ise: f64,
    pub isep: f64,
}
