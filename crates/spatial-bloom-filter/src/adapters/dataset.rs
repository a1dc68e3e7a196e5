//! Delimited dataset files
//!
//! Insert datasets hold `area,element` per line; check datasets hold either
//! `element` or `expected_area,element`. Records are read whole and handed
//! to the engine, which validates their shape before applying any of them.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::debug;

use crate::error::SbfResult;
use crate::ports::{Record, RecordSource};

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';

/// Dataset records read from any delimited stream
pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
}

impl CsvRecordSource<File> {
    /// Open a dataset file
    pub fn from_path(path: impl AsRef<Path>, delimiter: u8) -> SbfResult<Self> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Dataset opened");
        Ok(Self::from_reader(file, delimiter))
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Wrap a reader; the stream has no header row
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);
        Self { reader }
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn read_records(&mut self) -> SbfResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut raw = ByteRecord::new();
        while self.reader.read_byte_record(&mut raw)? {
            let fields = raw.iter().map(<[u8]>::to_vec).collect();
            records.push(Record::new(records.len() + 1, fields));
        }
        debug!(records = records.len(), "Dataset read");
        Ok(records)
    }
}
