//! CSV bar file adapter.
//!
//! Expects a header row `epoch,open,high,low,close,volume` with epoch seconds.

use crate::domain::bar::Bar;
use crate::domain::error::TrendswapError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct BarRecord {
    epoch: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, TrendswapError> {
        let file = File::open(&self.path).map_err(|e| TrendswapError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let mut bars = Vec::new();
        let mut last_epoch: Option<i64> = None;

        for (row, result) in rdr.deserialize::<BarRecord>().enumerate() {
            let record = result?;
            if last_epoch.is_some_and(|last| record.epoch <= last) {
                return Err(TrendswapError::UnorderedBars { row });
            }
            last_epoch = Some(record.epoch);

            let bar = Bar::from_epoch(
                record.epoch,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            )
            .ok_or_else(|| TrendswapError::Data {
                reason: format!("epoch {} out of range at row {}", record.epoch, row),
            })?;

            let date = bar.timestamp.date_naive();
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }
            bars.push(bar);
        }

        Ok(bars)
    }
}
