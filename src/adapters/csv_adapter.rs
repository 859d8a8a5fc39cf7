//! Streaming CSV bar source.
//!
//! Expected columns: `Date Time, Open, High, Low, Close, Volume`. A file that
//! splits date and time into two columns (seven in total) is accepted too.
//! Rows are read one at a time; the whole file is never held in memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::BarSource;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S%.3f",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Data rows to discard before the first bar (after any header row).
    pub skip_rows: usize,
    pub has_headers: bool,
}

pub struct CsvBarSource<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
    skip_rows: usize,
    previous: Option<NaiveDateTime>,
}

impl CsvBarSource<File> {
    pub fn open<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self, ConfluenceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConfluenceError::DataSource {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;
        Ok(Self::from_reader(file, options))
    }
}

impl<R: Read> CsvBarSource<R> {
    pub fn from_reader(reader: R, options: CsvOptions) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(options.has_headers)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        CsvBarSource {
            reader,
            record: StringRecord::new(),
            skip_rows: options.skip_rows,
            previous: None,
        }
    }

    fn read_record(&mut self) -> Result<bool, ConfluenceError> {
        self.reader
            .read_record(&mut self.record)
            .map_err(|e| ConfluenceError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })
    }

    fn row(&self) -> usize {
        self.record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default()
    }
}

impl<R: Read> BarSource for CsvBarSource<R> {
    fn next_bar(&mut self) -> Result<Option<OhlcvBar>, ConfluenceError> {
        while self.skip_rows > 0 {
            self.skip_rows -= 1;
            if !self.read_record()? {
                return Ok(None);
            }
        }
        if !self.read_record()? {
            return Ok(None);
        }
        let row = self.row();
        let bar = parse_record(&self.record, row)?;

        if let Some(time) = bar.time {
            if let Some(previous) = self.previous {
                if time < previous {
                    return Err(ConfluenceError::OutOfOrder {
                        row,
                        time: time.to_string(),
                        previous: previous.to_string(),
                    });
                }
            }
            self.previous = Some(time);
        }
        Ok(Some(bar))
    }
}

fn parse_record(record: &StringRecord, row: usize) -> Result<OhlcvBar, ConfluenceError> {
    let (time, first_value) = match record.len() {
        6 => (parse_time(&record[0]), 1),
        n if n >= 7 => (parse_time(&format!("{} {}", &record[0], &record[1])), 2),
        n => {
            return Err(ConfluenceError::DataSource {
                reason: format!("row {row}: expected 6 or 7 columns, found {n}"),
            });
        }
    };

    let field = |offset: usize, name: &str| -> Result<f64, ConfluenceError> {
        let raw = &record[first_value + offset];
        raw.parse::<f64>().map_err(|e| ConfluenceError::DataSource {
            reason: format!("row {row}: invalid {name} value {raw:?}: {e}"),
        })
    };

    let bar = OhlcvBar::new(
        field(0, "open")?,
        field(1, "high")?,
        field(2, "low")?,
        field(3, "close")?,
        field(4, "volume")?,
    );
    Ok(match time {
        Some(t) => bar.with_time(t),
        None => bar,
    })
}

/// Parse a timestamp in any of the supported layouts. Unknown layouts yield
/// `None`; the bar is still usable without a time.
pub fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
