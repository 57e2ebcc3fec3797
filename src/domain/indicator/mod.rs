//! Indicator transforms.
//!
//! Every transform is a pure function over equal-length slices that returns a
//! new column of the same length. Rows without enough history hold `0.0`.
//! The pipeline is responsible for reading inputs from and writing outputs to
//! the [`SeriesStore`](crate::domain::series::SeriesStore).

pub mod atr;
pub mod cci;
pub mod direction;
pub mod ema;
pub mod envelope;
pub mod spectral;
pub mod wma;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_three_places() {
        assert!((round_to(1.23456, 3) - 1.235).abs() < f64::EPSILON);
        assert!((round_to(-1.23456, 3) + 1.235).abs() < f64::EPSILON);
    }

    #[test]
    fn round_to_two_places_half_away_from_zero() {
        assert!((round_to(2.5, 0) - 3.0).abs() < f64::EPSILON);
        assert!((round_to(-2.5, 0) + 3.0).abs() < f64::EPSILON);
        assert!((round_to(10.125, 2) - 10.13).abs() < 1e-9);
    }
}
