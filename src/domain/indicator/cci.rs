//! Commodity Channel Index over the OHLC4 typical price.
//!
//! TP = (open + high + low + close) / 4
//! CCI = (TP - SMA(TP, n)) / (0.015 * meanAbsDev(TP, n)), rounded to 3 decimals.
//! A zero mean deviation or a zero result carries the previous row forward.
//! Warmup: first (n-1) rows are 0.

use crate::domain::indicator::round_to;

const LAMBERT: f64 = 0.015;

pub fn typical_price(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    open.iter()
        .zip(high)
        .zip(low)
        .zip(close)
        .map(|(((o, h), l), c)| (o + h + l + c) / 4.0)
        .collect()
}

pub fn cci(open: &[f64], high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tp = typical_price(open, high, low, close);
    let mut values = vec![0.0; tp.len()];
    if period == 0 {
        return values;
    }

    for i in period - 1..tp.len() {
        let window = &tp[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let mean_dev = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        let previous = if i > 0 { values[i - 1] } else { 0.0 };

        if mean_dev == 0.0 {
            values[i] = previous;
            continue;
        }
        let value = round_to((tp[i] - mean) / (LAMBERT * mean_dev), 3);
        values[i] = if value == 0.0 { previous } else { value };
    }

    values
}
