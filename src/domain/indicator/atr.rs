//! Average True Range with Wilder smoothing.
//!
//! TR[0] = high - low; TR[i] = max(high-low, |high-prevClose|, |low-prevClose|).
//! Seed at row n-1 with the mean of the first n true ranges, then
//! ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n. Warmup rows are 0.

pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let len = high.len().min(low.len()).min(close.len());
    (0..len)
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                hl
            } else {
                let prev_close = close[i - 1];
                hl.max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs())
            }
        })
        .collect()
}

pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tr = true_range(high, low, close);
    let mut values = vec![0.0; tr.len()];
    if period == 0 || tr.len() < period {
        return values;
    }

    let n = period as f64;
    values[period - 1] = tr[..period].iter().sum::<f64>() / n;
    for i in period..tr.len() {
        values[i] = (values[i - 1] * (n - 1.0) + tr[i]) / n;
    }

    values
}
