#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use trendswap::domain::bar::Bar;
use trendswap::domain::series::{ColumnId, SeriesStore};

/// 2025-01-02 04:00 UTC, 09:30 in the default +05:30 session.
pub const SESSION_OPEN: i64 = 1_735_790_400;

pub fn make_bar(minute: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::from_epoch(SESSION_OPEN + minute * 60, open, high, low, close, 1_000.0).unwrap()
}

pub fn flat_bar(minute: i64, close: f64) -> Bar {
    make_bar(minute, close, close, close, close)
}

/// One-minute bars tracing a slow oscillation with drift.
pub fn wave_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let c = 22_000.0 + 80.0 * (i as f64 / 9.0).sin() + 0.5 * i as f64;
            make_bar(i as i64, c - 1.0, c + 4.0, c - 4.0, c)
        })
        .collect()
}

/// Store with hand-set trend and direction columns, bypassing the pipeline.
pub fn signal_store(closes: &[f64], slow: &[f64], fast: &[f64], deviation: f64) -> SeriesStore {
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| flat_bar(i as i64, c))
        .collect();
    let n = bars.len();
    let mut store = SeriesStore::from_bars(&bars).unwrap();
    store.insert(ColumnId::SlowTrend, vec![1_000.0; n]).unwrap();
    store
        .insert(ColumnId::FastTrend, vec![1_000.0 + deviation; n])
        .unwrap();
    store.insert(ColumnId::SlowDirection, slow.to_vec()).unwrap();
    store.insert(ColumnId::FastDirection, fast.to_vec()).unwrap();
    store
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_bars_csv(path: &Path, bars: &[Bar]) {
    let mut content = String::from("epoch,open,high,low,close,volume\n");
    for bar in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.epoch, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    std::fs::write(path, content).unwrap();
}
