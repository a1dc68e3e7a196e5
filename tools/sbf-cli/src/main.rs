//! sbf: build, report on and query spatial Bloom filters from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use spatial_bloom_filter::{
    save_report, CsvRecordSource, FileSaltStore, FilterSnapshot, ReportMode, SaltPolicy,
    SbfConfig, SpatialBloomFilter, DEFAULT_DELIMITER,
};

/// Spatial Bloom filter tool
#[derive(Parser, Debug)]
#[command(name = "sbf")]
#[command(about = "Build, report on and query spatial Bloom filters")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Values that take precedence over the configuration file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Bits per cell index
    #[arg(long, global = true)]
    bits: Option<u32>,

    /// Hash algorithm, repeat for each member of the family
    #[arg(long = "hash", global = true)]
    hashes: Vec<String>,

    /// Number of areas
    #[arg(long, global = true)]
    areas: Option<u32>,

    /// Salt file
    #[arg(long, global = true)]
    salt: Option<PathBuf>,

    /// Create the salt file when it does not exist
    #[arg(long, global = true)]
    create_salt: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a salt file
    Salt {
        /// Number of salts
        #[arg(long)]
        count: usize,
        /// Bytes per salt
        #[arg(long)]
        length: Option<usize>,
        /// Output path, defaults to the configured salt file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Insert an `area,element` dataset and report on the result
    Build {
        #[arg(long)]
        dataset: PathBuf,
        /// Statistics report path; JSON statistics go to stdout when omitted
        #[arg(long)]
        report: Option<PathBuf>,
        /// Cell dump path
        #[arg(long)]
        cells: Option<PathBuf>,
        /// Decimals in reports
        #[arg(long, default_value = "5")]
        precision: usize,
        /// Store the populated filter for later checks
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Dataset field delimiter
        #[arg(long, default_value_t = DEFAULT_DELIMITER as char)]
        delimiter: char,
    },
    /// Check elements against a stored filter
    Check {
        #[arg(long)]
        snapshot: PathBuf,
        /// Single element to check
        #[arg(long, conflicts_with = "dataset", required_unless_present = "dataset")]
        element: Option<String>,
        /// `element` or `expected_area,element` dataset
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Dataset field delimiter
        #[arg(long, default_value_t = DEFAULT_DELIMITER as char)]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), &cli.overrides)?;

    match cli.command {
        Command::Salt { count, length, out } => {
            let path = out.unwrap_or_else(|| config.salt_path.clone());
            let length = length.unwrap_or(config.salt_length);
            FileSaltStore::create(&path, count, length)
                .with_context(|| format!("Failed to create salt file {}", path.display()))?;
            println!("{}", path.display());
        }
        Command::Build {
            dataset,
            report,
            cells,
            precision,
            snapshot,
            delimiter,
        } => {
            let mut filter =
                SpatialBloomFilter::from_config(&config).context("Failed to build filter")?;
            let mut source = CsvRecordSource::from_path(&dataset, delimiter_byte(delimiter)?)
                .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;
            let summary = filter
                .insert_from_source(&mut source)
                .context("Failed to insert dataset")?;
            info!(inserted = summary.inserted, "Dataset inserted");

            if let Some(path) = &cells {
                save_report(&filter, path, ReportMode::Cells, precision)
                    .with_context(|| format!("Failed to write cells to {}", path.display()))?;
            }
            if let Some(path) = &snapshot {
                let bytes = filter.snapshot().to_bytes()?;
                fs::write(path, bytes)
                    .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
                info!(path = %path.display(), "Snapshot saved");
            }
            match &report {
                Some(path) => save_report(&filter, path, ReportMode::Statistics, precision)
                    .with_context(|| format!("Failed to write report {}", path.display()))?,
                None => print_json(&filter.statistics().snapshot())?,
            }
        }
        Command::Check {
            snapshot,
            element,
            dataset,
            delimiter,
        } => {
            let bytes = fs::read(&snapshot)
                .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
            let snapshot = FilterSnapshot::from_bytes(&bytes)?;
            let filter = SpatialBloomFilter::restore(snapshot, &restore_salts(&config))
                .context("Failed to restore filter")?;

            match (element, dataset) {
                (Some(element), _) => print_json(&filter.check(element.as_bytes()))?,
                (None, Some(path)) => {
                    let mut source = CsvRecordSource::from_path(&path, delimiter_byte(delimiter)?)
                        .with_context(|| format!("Failed to open dataset {}", path.display()))?;
                    print_json(&filter.check_from_source(&mut source)?)?;
                }
                (None, None) => bail!("Either --element or --dataset is required"),
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Read the configuration file, if any, then apply command-line overrides
fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<SbfConfig> {
    let mut config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SbfConfig::from_json(&json)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => SbfConfig::default(),
    };

    if let Some(bits) = overrides.bits {
        config.bit_mapping = bits;
    }
    if !overrides.hashes.is_empty() {
        config.hash_family = overrides.hashes.clone();
    }
    if let Some(areas) = overrides.areas {
        config.num_areas = areas;
    }
    if let Some(salt) = &overrides.salt {
        config.salt_path = salt.clone();
    }
    if overrides.create_salt {
        config.salt_policy = SaltPolicy::CreateIfMissing;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Salts for a stored filter must be the ones it was built with, so they are never created
fn restore_salts(config: &SbfConfig) -> FileSaltStore {
    FileSaltStore::new(&config.salt_path, config.salt_length, SaltPolicy::RequireExisting)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got {:?}", delimiter);
    }
    Ok(delimiter as u8)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
