//! Spectral low-pass filter feeding an adaptive scalar Kalman filter.
//!
//! For every row the trailing window of up to `W` source values is zero-padded
//! to the next power of two `N`, transformed, stripped of every bin in
//! `[cutoff, N - cutoff)` with `cutoff = clamp(N / D, 1, N / 2)`, and inverted.
//! The real part at the last un-padded sample is that row's low-pass value.
//! A constant window comes back unchanged only when its length is already a
//! power of two; otherwise the zero padding pulls the value down, which shows
//! in the warm-up rows before the window fills.
//!
//! The Kalman stage runs once over the whole low-pass series. Measurement noise
//! `R` is the population variance of `source - lowpass` (floored at 1e-6) and
//! process noise is `Q = max(0.01 * R, 1e-6)`. Outputs are ceiled.

use rustfft::{FftPlanner, num_complex::Complex};

const VARIANCE_FLOOR: f64 = 1e-6;
const PROCESS_NOISE_RATIO: f64 = 0.01;

/// Ideal low-pass filter over a sliding window.
pub struct SpectralFilter {
    planner: FftPlanner<f64>,
    cutoff_divisor: usize,
}

impl SpectralFilter {
    pub fn new(cutoff_divisor: usize) -> Self {
        Self {
            planner: FftPlanner::new(),
            cutoff_divisor: cutoff_divisor.max(1),
        }
    }

    /// Low-pass the window and return the filtered value at its last sample.
    pub fn smooth_last(&mut self, window: &[f64]) -> f64 {
        let Some(&last) = window.last() else {
            return 0.0;
        };
        let n = window.len().next_power_of_two();
        if n < 2 {
            return last;
        }

        let mut buffer: Vec<Complex<f64>> = window
            .iter()
            .map(|&v| Complex::new(v, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(n)
            .collect();

        self.planner.plan_fft_forward(n).process(&mut buffer);

        let cutoff = (n / self.cutoff_divisor).clamp(1, n / 2);
        for bin in &mut buffer[cutoff..n - cutoff] {
            *bin = Complex::new(0.0, 0.0);
        }

        self.planner.plan_fft_inverse(n).process(&mut buffer);
        buffer[window.len() - 1].re / n as f64
    }

    /// Low-pass value for every row, each over its own trailing window.
    pub fn smooth_series(&mut self, source: &[f64], window: usize) -> Vec<f64> {
        let window = window.max(1);
        (0..source.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(window);
                self.smooth_last(&source[start..=i])
            })
            .collect()
    }
}

/// Scalar random-walk Kalman filter.
#[derive(Debug, Clone, Copy)]
pub struct ScalarKalman {
    pub x: f64, // state estimate
    pub p: f64, // estimate variance
    pub q: f64, // process noise
    pub r: f64, // measurement noise
}

impl ScalarKalman {
    pub fn new(initial: f64, p: f64, q: f64, r: f64) -> Self {
        Self { x: initial, p, q, r }
    }

    pub fn predict(&mut self) {
        self.p += self.q;
    }

    /// Fold in one measurement and return the gain that was applied.
    pub fn correct(&mut self, measurement: f64) -> f64 {
        let k = self.p / (self.p + self.r);
        self.x += k * (measurement - self.x);
        self.p *= 1.0 - k;
        k
    }
}

/// Population variance of `source - smoothed`.
pub fn residual_variance(source: &[f64], smoothed: &[f64]) -> f64 {
    if source.is_empty() || source.len() != smoothed.len() {
        return 0.0;
    }
    let n = source.len() as f64;
    let residuals: Vec<f64> = source.iter().zip(smoothed).map(|(s, f)| s - f).collect();
    let mean = residuals.iter().sum::<f64>() / n;
    residuals.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n
}

/// Run the filter over `measurements`, starting at the first measurement with
/// variance `r`. The first row is corrected but not predicted.
pub fn kalman_smooth(measurements: &[f64], q: f64, r: f64) -> Vec<f64> {
    let Some(&first) = measurements.first() else {
        return Vec::new();
    };
    let mut filter = ScalarKalman::new(first, r, q, r);
    measurements
        .iter()
        .enumerate()
        .map(|(i, &z)| {
            if i > 0 {
                filter.predict();
            }
            filter.correct(z);
            filter.x
        })
        .collect()
}

/// Spectral low-pass followed by the adaptive Kalman stage, ceiled.
pub fn kalman_trend(source: &[f64], window: usize, cutoff_divisor: usize) -> Vec<f64> {
    let lowpass = SpectralFilter::new(cutoff_divisor).smooth_series(source, window);

    let r = residual_variance(source, &lowpass).max(VARIANCE_FLOOR);
    let q = (PROCESS_NOISE_RATIO * r).max(VARIANCE_FLOOR);

    kalman_smooth(&lowpass, q, r)
        .into_iter()
        .map(f64::ceil)
        .collect()
}
