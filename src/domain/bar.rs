//! OHLCV bar representation.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub epoch: i64,
}

impl Bar {
    /// Build a bar from epoch seconds; returns `None` if the epoch is out of range.
    pub fn from_epoch(
        epoch: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Option<Self> {
        let timestamp = DateTime::from_timestamp(epoch, 0)?;
        Some(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            epoch,
        })
    }
}
