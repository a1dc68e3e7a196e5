//! Salt Store
//!
//! Salts live in a plain text file, one base64 line per salt. The file is
//! read once when a filter is built.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;

use crate::domain::{SaltPolicy, SbfConfig, SpatialBloomFilter};
use crate::error::{ConfigError, SbfError, SbfResult};
use crate::ports::SaltSource;

/// File-backed salt source
#[derive(Clone, Debug)]
pub struct FileSaltStore {
    path: PathBuf,
    length: usize,
    policy: SaltPolicy,
}

impl FileSaltStore {
    /// Store at `path` generating salts of `length` bytes when allowed to
    pub fn new(path: impl Into<PathBuf>, length: usize, policy: SaltPolicy) -> Self {
        Self {
            path: path.into(),
            length,
            policy,
        }
    }

    /// Store described by a filter configuration
    pub fn from_config(config: &SbfConfig) -> Self {
        Self::new(&config.salt_path, config.salt_length, config.salt_policy)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `count` salts from `path`
    ///
    /// Blank lines are skipped. Extra salts beyond `count` are ignored.
    pub fn load(path: &Path, count: usize) -> SbfResult<Vec<Vec<u8>>> {
        let contents = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::SaltFileMissing(path.to_path_buf()).into(),
            _ => SbfError::Io(e),
        })?;

        let mut salts = Vec::with_capacity(count);
        for (i, line) in contents.split(|&b| b == b'\n').enumerate() {
            if salts.len() == count {
                break;
            }
            let line = std::str::from_utf8(line)
                .map_err(|e| ConfigError::InvalidSaltEncoding {
                    line: i + 1,
                    reason: e.to_string(),
                })?
                .trim();
            if line.is_empty() {
                continue;
            }
            let salt = STANDARD
                .decode(line)
                .map_err(|e| ConfigError::InvalidSaltEncoding {
                    line: i + 1,
                    reason: e.to_string(),
                })?;
            if salt.is_empty() {
                return Err(ConfigError::InvalidSaltEncoding {
                    line: i + 1,
                    reason: "empty salt".into(),
                }
                .into());
            }
            salts.push(salt);
        }

        if salts.len() < count {
            return Err(ConfigError::InsufficientSalts {
                found: salts.len(),
                required: count,
            }
            .into());
        }

        info!(path = %path.display(), count, "Hash salts loaded");
        Ok(salts)
    }

    /// Generate `count` random salts of `length` bytes and write them to `path`
    pub fn create(path: &Path, count: usize, length: usize) -> SbfResult<Vec<Vec<u8>>> {
        if length == 0 {
            return Err(ConfigError::InvalidSaltLength { length }.into());
        }

        let salts = random_salts(count, length);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut contents = String::new();
        for salt in &salts {
            contents.push_str(&STANDARD.encode(salt));
            contents.push('\n');
        }
        fs::write(path, contents)?;

        info!(path = %path.display(), count, length, "Hash salts created");
        Ok(salts)
    }
}

impl SaltSource for FileSaltStore {
    fn salts(&self, count: usize) -> SbfResult<Vec<Vec<u8>>> {
        match self.policy {
            SaltPolicy::RequireExisting => Self::load(&self.path, count),
            SaltPolicy::CreateIfMissing if !self.path.exists() => {
                Self::create(&self.path, count, self.length)
            }
            SaltPolicy::CreateIfMissing => Self::load(&self.path, count),
        }
    }
}

/// In-memory salt source
#[derive(Clone, Debug, Default)]
pub struct StaticSalts {
    salts: Vec<Vec<u8>>,
}

impl StaticSalts {
    pub fn new(salts: Vec<Vec<u8>>) -> Self {
        Self { salts }
    }

    /// Fresh random salts, not persisted anywhere
    pub fn generated(count: usize, length: usize) -> Self {
        Self::new(random_salts(count, length))
    }
}

impl SaltSource for StaticSalts {
    fn salts(&self, count: usize) -> SbfResult<Vec<Vec<u8>>> {
        if self.salts.len() < count {
            return Err(ConfigError::InsufficientSalts {
                found: self.salts.len(),
                required: count,
            }
            .into());
        }
        Ok(self.salts[..count].to_vec())
    }
}

fn random_salts(count: usize, length: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let mut salt = vec![0u8; length];
            OsRng.fill_bytes(&mut salt);
            salt
        })
        .collect()
}

impl SpatialBloomFilter {
    /// Create a filter using the salt file and policy named in the config
    pub fn from_config(config: &SbfConfig) -> SbfResult<Self> {
        Self::new(config, &FileSaltStore::from_config(config))
    }
}
