//! CSV trade log writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::domain::error::ConfluenceError;
use crate::domain::position::ClosedTrade;
use crate::ports::report_port::TradeSink;

const HEADER: [&str; 7] = [
    "side",
    "entry_time",
    "exit_time",
    "entry_price",
    "exit_price",
    "pnl",
    "exit_reason",
];

pub struct CsvTradeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvTradeWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ConfluenceError> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvTradeWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self, ConfluenceError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(HEADER).map_err(csv_error)?;
        Ok(CsvTradeWriter { writer })
    }

    pub fn into_inner(self) -> Result<W, ConfluenceError> {
        self.writer
            .into_inner()
            .map_err(|e| ConfluenceError::Io(std::io::Error::other(e.to_string())))
    }
}

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn csv_error(e: csv::Error) -> ConfluenceError {
    ConfluenceError::Io(e.into())
}

impl<W: Write> TradeSink for CsvTradeWriter<W> {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), ConfluenceError> {
        self.writer
            .write_record([
                trade.side.as_str().to_string(),
                format_time(trade.entry_time),
                format_time(trade.exit_time),
                trade.entry_price.to_string(),
                trade.exit_price.to_string(),
                trade.pnl.to_string(),
                trade.exit_reason.as_str().to_string(),
            ])
            .map_err(csv_error)
    }

    fn flush(&mut self) -> Result<(), ConfluenceError> {
        self.writer.flush()?;
        Ok(())
    }
}
