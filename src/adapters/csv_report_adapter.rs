//! Writes run output as CSV and plain text files in one directory.

use crate::domain::aggregator::TradeRecord;
use crate::domain::error::TrendswapError;
use crate::domain::metrics::Stats;
use crate::domain::series::SeriesStore;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::{Path, PathBuf};

pub const TRADES_FILE: &str = "trades.csv";
pub const SERIES_FILE: &str = "series.csv";
pub const SUMMARY_FILE: &str = "summary.txt";

pub struct CsvReportAdapter {
    dir: PathBuf,
}

impl CsvReportAdapter {
    /// Creates `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, TrendswapError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(&self, trades: &[TradeRecord]) -> Result<(), TrendswapError> {
        let mut writer = csv::Writer::from_path(self.dir.join(TRADES_FILE))?;
        for trade in trades {
            writer.serialize(trade)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_series(&self, store: &SeriesStore) -> Result<(), TrendswapError> {
        let mut writer = csv::Writer::from_path(self.dir.join(SERIES_FILE))?;
        let columns: Vec<_> = store.column_ids().collect();

        let mut header = vec!["timestamp".to_string(), "epoch".to_string()];
        header.extend(columns.iter().map(|c| c.name().to_string()));
        writer.write_record(&header)?;

        for row in store.rows() {
            let mut record = vec![row.timestamp.to_rfc3339(), row.epoch.to_string()];
            record.extend(row.values.iter().map(|(_, v)| v.to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_summary(&self, stats: &Stats) -> Result<(), TrendswapError> {
        fs::write(self.dir.join(SUMMARY_FILE), stats.to_string())?;
        Ok(())
    }
}
