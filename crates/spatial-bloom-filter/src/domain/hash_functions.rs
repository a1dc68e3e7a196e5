//! Salted digest indexing for the spatial Bloom filter
//!
//! Every element is XORed with a per-hash salt, digested, and the leading
//! `bit_mapping` bits of the digest select a cell.

use std::fmt;
use std::str::FromStr;

use md4::Md4;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::error::ConfigError;

/// Supported digest algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md4,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Every supported algorithm
    pub const ALL: [HashAlgorithm; 7] = [
        HashAlgorithm::Md4,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Canonical lowercase identifier
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md4 => "md4",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Md4 | HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Digest `data` with this algorithm
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Md4 => run::<Md4>(data),
            HashAlgorithm::Md5 => run::<Md5>(data),
            HashAlgorithm::Sha1 => run::<Sha1>(data),
            HashAlgorithm::Sha224 => run::<Sha224>(data),
            HashAlgorithm::Sha256 => run::<Sha256>(data),
            HashAlgorithm::Sha384 => run::<Sha384>(data),
            HashAlgorithm::Sha512 => run::<Sha512>(data),
        }
    }
}

fn run<D: Digest>(data: &[u8]) -> Vec<u8> {
    D::digest(data).to_vec()
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md4" => Ok(HashAlgorithm::Md4),
            "md5" => Ok(HashAlgorithm::Md5),
            "sha" | "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(ConfigError::UnsupportedHash(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// XOR the element with the salt byte by byte
///
/// The result is as long as the shorter of the two inputs.
pub fn salt_element(element: &[u8], salt: &[u8]) -> Vec<u8> {
    element.iter().zip(salt).map(|(e, s)| e ^ s).collect()
}

/// Take the most significant `bit_mapping` bits of a digest
///
/// Reads `ceil(bit_mapping / 8)` leading bytes big-endian and shifts off the
/// excess low bits of the last byte. The digest must hold at least that many
/// bytes, which holds for every supported algorithm up to 32 bits.
pub fn truncate_digest(digest: &[u8], bit_mapping: u32) -> usize {
    let bytes = bit_mapping.div_ceil(8) as usize;
    let value = digest[..bytes]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let excess = bytes as u32 * 8 - bit_mapping;
    (value >> excess) as usize
}

/// Compute the cell index of an element for a single hash function
pub fn compute_index(
    algorithm: HashAlgorithm,
    element: &[u8],
    salt: &[u8],
    bit_mapping: u32,
) -> usize {
    let buffer = salt_element(element, salt);
    truncate_digest(&algorithm.digest(&buffer), bit_mapping)
}

/// Compute the digest index set of an element
///
/// One index per hash function, in family order; `salts[i]` pairs with
/// `family[i]`.
pub fn compute_digest_indices<S: AsRef<[u8]>>(
    family: &[HashAlgorithm],
    salts: &[S],
    element: &[u8],
    bit_mapping: u32,
) -> Vec<usize> {
    family
        .iter()
        .zip(salts)
        .map(|(&algorithm, salt)| compute_index(algorithm, element, salt.as_ref(), bit_mapping))
        .collect()
}
