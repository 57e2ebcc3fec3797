//! Exponential and simple moving averages.
//!
//! EMA: k = 2/(n+1), seeded with the first source value so there is no warmup
//! gap; EMA[i] = S[i]*k + EMA[i-1]*(1-k). Output is ceiled to whole units.
//!
//! SMA: mean of the trailing n rows, or of the available prefix while fewer
//! than n rows exist. Output is rounded to 2 decimals; `trailing_mean` is the
//! same average left unrounded.

use crate::domain::indicator::round_to;

pub fn ema(source: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![0.0; source.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(source.len());
    let mut ema = 0.0;

    for (i, &value) in source.iter().enumerate() {
        ema = if i == 0 {
            value
        } else {
            value * k + ema * (1.0 - k)
        };
        values.push(ema.ceil());
    }

    values
}

pub fn sma(source: &[f64], period: usize) -> Vec<f64> {
    trailing_mean(source, period)
        .into_iter()
        .map(|v| round_to(v, 2))
        .collect()
}

pub fn trailing_mean(source: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![0.0; source.len()];
    }

    let mut values = Vec::with_capacity(source.len());
    let mut sum = 0.0;

    for (i, &value) in source.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= source[i - period];
        }
        let count = (i + 1).min(period);
        values.push(sum / count as f64);
    }

    values
}
