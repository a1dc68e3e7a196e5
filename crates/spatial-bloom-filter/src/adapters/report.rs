//! Report export
//!
//! Statistics reports are `;`-delimited: `key;value` metadata rows, then an
//! area table with a header row. A cells report lists one cell value per
//! line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::domain::{SpatialBloomFilter, StatisticsReport};
use crate::error::SbfResult;

/// Field delimiter of statistics reports
pub const REPORT_DELIMITER: u8 = b';';

/// Column order of the area table
pub const AREA_COLUMNS: [&str; 12] = [
    "Area",
    "Members",
    "Expected cells",
    "Self-collisions",
    "Cells",
    "Expected emersion",
    "Emersion",
    "A-priori fpp",
    "Fpp",
    "A-priori isep",
    "Expected ise",
    "Isep",
];

/// What a report contains
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportMode {
    /// Configuration, counters and every estimator
    Statistics,
    /// Raw cell values
    Cells,
}

/// Write a report of `filter` to `writer`, formatting reals with `precision` decimals
pub fn write_report<W: Write>(
    filter: &SpatialBloomFilter,
    writer: W,
    mode: ReportMode,
    precision: usize,
) -> SbfResult<()> {
    match mode {
        ReportMode::Statistics => {
            write_statistics(&filter.statistics().snapshot(), writer, precision)
        }
        ReportMode::Cells => write_cells(filter, writer),
    }
}

/// Create `path` and write a report into it
pub fn save_report(
    filter: &SpatialBloomFilter,
    path: impl AsRef<Path>,
    mode: ReportMode,
    precision: usize,
) -> SbfResult<()> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    write_report(filter, file, mode, precision)?;
    info!(path = %path.display(), ?mode, "Report saved");
    Ok(())
}

/// Write a statistics report
pub fn write_statistics<W: Write>(
    report: &StatisticsReport,
    writer: W,
    precision: usize,
) -> SbfResult<()> {
    let real = |v: f64| format!("{:.*}", precision, v);
    let mut out = WriterBuilder::new()
        .delimiter(REPORT_DELIMITER)
        .flexible(true)
        .from_writer(writer);

    let metadata = [
        ("Hash family", report.hash_family.join(",")),
        ("Number of hashes", report.hash_count.to_string()),
        ("Number of areas", report.num_areas.to_string()),
        ("Bit mapping", report.bit_mapping.to_string()),
        ("Number of cells", report.num_cells.to_string()),
        ("Cell size", report.cell_size.to_string()),
        ("Size in bytes", report.size_in_bytes.to_string()),
        ("Members", report.members.to_string()),
        ("Collisions", report.collisions.to_string()),
        ("Sparsity", real(report.sparsity)),
        ("A-priori fpp", real(report.apriori_fpp)),
        ("Fpp", real(report.fpp)),
        ("A-priori safeness probability", real(report.apriori_safeness)),
    ];
    for (key, value) in &metadata {
        out.write_record([*key, value.as_str()])?;
    }

    out.write_record(AREA_COLUMNS)?;
    for row in &report.areas {
        out.write_record([
            row.area.to_string(),
            row.members.to_string(),
            real(row.expected_cells),
            row.self_collisions.to_string(),
            row.cells.to_string(),
            real(row.expected_emersion),
            real(row.emersion),
            real(row.apriori_fpp),
            real(row.fpp),
            real(row.apriori_isep),
            real(row.expected_ise),
            real(row.isep),
        ])?;
    }

    out.flush()?;
    Ok(())
}

fn write_cells<W: Write>(filter: &SpatialBloomFilter, mut writer: W) -> SbfResult<()> {
    for cell in filter.cells() {
        writeln!(writer, "{}", cell)?;
    }
    writer.flush()?;
    Ok(())
}
