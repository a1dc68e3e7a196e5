//! Cross-module flows exercised through the public API only

pub mod flows;
pub mod snapshot;
pub mod two_areas;

use std::collections::HashMap;
use std::io::Read;

/// A statistics report read back from its `;`-delimited form
#[derive(Debug, Default)]
pub struct ParsedReport {
    pub metadata: HashMap<String, String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedReport {
    /// Split a report into metadata pairs, the area header and area rows
    pub fn parse<R: Read>(reader: R) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut report = ParsedReport::default();
        for record in reader.records() {
            let record = record?;
            let fields: Vec<String> = record.iter().map(str::to_owned).collect();
            if !report.header.is_empty() {
                report.rows.push(fields);
            } else if fields.first().map(String::as_str) == Some("Area") {
                report.header = fields;
            } else if let [key, value] = fields.as_slice() {
                report.metadata.insert(key.clone(), value.clone());
            }
        }
        Ok(report)
    }

    pub fn real(&self, key: &str) -> Option<f64> {
        self.metadata.get(key)?.parse().ok()
    }

    pub fn integer(&self, key: &str) -> Option<u64> {
        self.metadata.get(key)?.parse().ok()
    }

    /// Value of `column` for `area`
    pub fn area_value(&self, area: u16, column: &str) -> Option<f64> {
        let position = self.header.iter().position(|h| h == column)?;
        let row = self.rows.get(usize::from(area).checked_sub(1)?)?;
        row.get(position)?.parse().ok()
    }
}
