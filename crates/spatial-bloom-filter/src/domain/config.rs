//! Spatial Bloom filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use spatial_bloom_filter::domain::{SaltPolicy, SbfConfigBuilder};
//!
//! let config = SbfConfigBuilder::new()
//!     .bit_mapping(10)
//!     .hash_family(["md5", "sha1", "sha256"])
//!     .num_areas(4)
//!     .salt_policy(SaltPolicy::CreateIfMissing)
//!     .build()
//!     .expect("Valid config");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::hash_functions::HashAlgorithm;
use crate::error::ConfigError;

/// Upper bound on `bit_mapping`: the filter holds at most 2^32 cells
///
/// Cells are allocated up front, so 32 bits costs 4 GiB (8 GiB with wide
/// cells). Targets whose `usize` cannot hold `2^bit_mapping` reject it.
pub const MAX_BIT_MAPPING: u32 = 32;
/// Upper bound on the number of areas (cells are at most 2 bytes wide)
pub const MAX_AREA_NUMBER: u32 = u16::MAX as u32;
/// Upper bound on the number of hash functions in a family
pub const MAX_HASH_NUMBER: usize = 10;
/// Maximum number of input bytes combined with a salt
pub const MAX_INPUT_SIZE: usize = 128;
/// Salt file used when none is configured
pub const DEFAULT_SALT_PATH: &str = "hash_salt/hash_salt";

/// What to do when the salt file does not exist at construction time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltPolicy {
    /// Fail with a configuration error
    #[default]
    RequireExisting,
    /// Generate fresh salts and persist them
    CreateIfMissing,
}

/// Spatial Bloom filter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SbfConfig {
    /// Filter composed of 2^bit_mapping cells
    pub bit_mapping: u32,
    /// Digest algorithms, in probe order
    pub hash_family: Vec<String>,
    /// Number of areas; labels run from 1 to num_areas
    pub num_areas: u32,
    /// Location of the base64 salt file
    pub salt_path: PathBuf,
    /// Length in bytes of generated salts
    pub salt_length: usize,
    /// Behaviour when the salt file is missing
    pub salt_policy: SaltPolicy,
}

impl Default for SbfConfig {
    fn default() -> Self {
        Self {
            bit_mapping: 10,
            hash_family: vec!["md5".into(), "sha1".into(), "sha256".into()],
            num_areas: 4,
            salt_path: PathBuf::from(DEFAULT_SALT_PATH),
            salt_length: MAX_INPUT_SIZE,
            salt_policy: SaltPolicy::RequireExisting,
        }
    }
}

impl SbfConfig {
    /// Validate all parameter bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_mapping == 0 || self.bit_mapping > MAX_BIT_MAPPING {
            return Err(ConfigError::InvalidBitMapping {
                bit_mapping: self.bit_mapping,
                max: MAX_BIT_MAPPING,
            });
        }

        if cell_count(self.bit_mapping).is_none() {
            return Err(ConfigError::InvalidBitMapping {
                bit_mapping: self.bit_mapping,
                max: usize::BITS - 1,
            });
        }

        if self.num_areas == 0 || self.num_areas > MAX_AREA_NUMBER {
            return Err(ConfigError::InvalidAreaCount {
                num_areas: self.num_areas,
                max: MAX_AREA_NUMBER,
            });
        }

        if self.salt_length == 0 {
            return Err(ConfigError::InvalidSaltLength {
                length: self.salt_length,
            });
        }

        self.hash_algorithms().map(|_| ())
    }

    /// Resolve the hash family against the supported algorithm registry
    pub fn hash_algorithms(&self) -> Result<Vec<HashAlgorithm>, ConfigError> {
        if self.hash_family.is_empty() {
            return Err(ConfigError::EmptyHashFamily);
        }
        if self.hash_family.len() > MAX_HASH_NUMBER {
            return Err(ConfigError::TooManyHashes {
                count: self.hash_family.len(),
                max: MAX_HASH_NUMBER,
            });
        }
        self.hash_family.iter().map(|name| name.parse()).collect()
    }

    /// Number of cells in the filter, 0 when `bit_mapping` does not fit a `usize`
    pub fn num_cells(&self) -> usize {
        cell_count(self.bit_mapping).unwrap_or(0)
    }

    /// Load a configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builder-style method to set the salt file
    pub fn with_salt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.salt_path = path.into();
        self
    }

    /// Builder-style method to set the salt policy
    pub fn with_salt_policy(mut self, policy: SaltPolicy) -> Self {
        self.salt_policy = policy;
        self
    }
}

/// `2^bit_mapping`, or `None` when the platform cannot address that many cells
pub(crate) fn cell_count(bit_mapping: u32) -> Option<usize> {
    1usize.checked_shl(bit_mapping)
}

/// Builder for SbfConfig with validation
#[derive(Default)]
pub struct SbfConfigBuilder {
    bit_mapping: Option<u32>,
    hash_family: Option<Vec<String>>,
    num_areas: Option<u32>,
    salt_path: Option<PathBuf>,
    salt_length: Option<usize>,
    salt_policy: Option<SaltPolicy>,
}

impl SbfConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of index bits (filter holds 2^bits cells)
    pub fn bit_mapping(mut self, bits: u32) -> Self {
        self.bit_mapping = Some(bits);
        self
    }

    /// Set the hash family by algorithm identifiers
    pub fn hash_family<I, S>(mut self, family: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hash_family = Some(family.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of areas
    pub fn num_areas(mut self, areas: u32) -> Self {
        self.num_areas = Some(areas);
        self
    }

    /// Set the salt file location
    pub fn salt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.salt_path = Some(path.into());
        self
    }

    /// Set the length of generated salts
    pub fn salt_length(mut self, length: usize) -> Self {
        self.salt_length = Some(length);
        self
    }

    /// Set the missing-salt-file policy
    pub fn salt_policy(mut self, policy: SaltPolicy) -> Self {
        self.salt_policy = Some(policy);
        self
    }

    /// Build the SbfConfig, validating all parameters
    pub fn build(self) -> Result<SbfConfig, ConfigError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> SbfConfig {
        let defaults = SbfConfig::default();

        SbfConfig {
            bit_mapping: self.bit_mapping.unwrap_or(defaults.bit_mapping),
            hash_family: self.hash_family.unwrap_or(defaults.hash_family),
            num_areas: self.num_areas.unwrap_or(defaults.num_areas),
            salt_path: self.salt_path.unwrap_or(defaults.salt_path),
            salt_length: self.salt_length.unwrap_or(defaults.salt_length),
            salt_policy: self.salt_policy.unwrap_or(defaults.salt_policy),
        }
    }
}
