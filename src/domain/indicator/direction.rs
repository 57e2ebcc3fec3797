//! Direction ("swap") detectors.
//!
//! Each detector emits -1, 0 or +1 per row. A row holds the previous row's
//! direction unless an expansion test lets the source pick a new side, and any
//! row outside the active session is forced to 0.

use chrono::{DateTime, Utc};

use crate::domain::indicator::atr::atr;
use crate::domain::indicator::ema::trailing_mean;
use crate::domain::indicator::round_to;
use crate::domain::session::SessionWindow;

/// Direction from consecutive values of a smoothed series.
///
/// Expansion: |S[i] - S[i-1]| > factor * ATR[i]. Rows 0 and 1 are 0.
pub fn kalman_direction(
    source: &[f64],
    atr: &[f64],
    factor: f64,
    timestamps: &[DateTime<Utc>],
    session: &SessionWindow,
) -> Vec<f64> {
    let len = source.len().min(atr.len()).min(timestamps.len());
    let mut swap = vec![0.0; len];

    for i in 2..len {
        swap[i] = swap[i - 1];
        let change = source[i] - source[i - 1];
        if change.abs() > factor * atr[i] {
            if change > 0.0 {
                swap[i] = 1.0;
            } else if change < 0.0 {
                swap[i] = -1.0;
            }
        }
        if !session.is_active(timestamps[i]) {
            swap[i] = 0.0;
        }
    }

    swap
}

/// Price inputs for the expansion gate of [`average_direction`].
pub struct PriceColumns<'a> {
    pub high: &'a [f64],
    pub low: &'a [f64],
    pub close: &'a [f64],
}

/// Direction from a source compared against a reference average.
///
/// Expansion: ATR(3)[i] + |C[i-2] - C[i]| > ATR(10)[i]. Under expansion the
/// source side of the average picks the direction. The previous direction is
/// then held when the source moved less than the unrounded mean of ATR(5)
/// over 10 rows, measured across two rows.
/// Row 1 compares against the average with no gate; row 0 is 0.
pub fn average_direction(
    source: &[f64],
    average: &[f64],
    prices: &PriceColumns<'_>,
    timestamps: &[DateTime<Utc>],
    session: &SessionWindow,
) -> Vec<f64> {
    let len = source
        .len()
        .min(average.len())
        .min(prices.close.len())
        .min(timestamps.len());
    let atr3 = atr(prices.high, prices.low, prices.close, 3);
    let atr5 = atr(prices.high, prices.low, prices.close, 5);
    let atr10 = atr(prices.high, prices.low, prices.close, 10);
    let hold_threshold = trailing_mean(&atr5, 10);

    let side = |i: usize, current: f64| {
        if source[i] > average[i] {
            1.0
        } else if source[i] < average[i] {
            -1.0
        } else {
            current
        }
    };

    let mut swap = vec![0.0; len];
    for i in 1..len {
        swap[i] = swap[i - 1];

        if i >= 2 {
            let expansion = atr3[i] + (prices.close[i - 2] - prices.close[i]).abs() > atr10[i];
            if expansion {
                swap[i] = side(i, swap[i]);
            }
            let moved = (round_to(source[i], 3) - round_to(source[i - 2], 3)).abs();
            if moved < hold_threshold[i] {
                swap[i] = swap[i - 1];
            }
        } else {
            swap[i] = side(i, swap[i]);
        }

        if !session.is_active(timestamps[i]) {
            swap[i] = 0.0;
        }
    }

    swap
}

#[cfg(test)]
mod tests {
    use super::*;

    // 04:00 UTC == 09:30 IST, one-minute bars
    fn in_session(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| DateTime::from_timestamp(1_735_790_400 + 60 * i as i64, 0).unwrap())
            .collect()
    }

    #[test]
    fn kalman_direction_first_two_rows_are_zero() {
        let out = kalman_direction(
            &[100.0, 110.0, 120.0],
            &[1.0; 3],
            0.25,
            &in_session(3),
            &SessionWindow::default(),
        );
        assert_eq!(out, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn kalman_direction_holds_without_expansion() {
        let source = [100.0, 100.0, 110.0, 110.5, 100.0];
        let out = kalman_direction(
            &source,
            &[4.0; 5],
            0.25,
            &in_session(5),
            &SessionWindow::default(),
        );
        // 0.5 < 0.25 * 4 holds +1, then -10.5 flips
        assert_eq!(out, vec![0.0, 0.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn kalman_direction_zero_outside_session() {
        // 10:30 UTC == 16:00 IST
        let timestamps: Vec<_> = (0..3)
            .map(|i| DateTime::from_timestamp(1_735_813_800 + 60 * i, 0).unwrap())
            .collect();
        let out = kalman_direction(
            &[100.0, 110.0, 120.0],
            &[1.0; 3],
            0.25,
            &timestamps,
            &SessionWindow::default(),
        );
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn average_direction_row_one_compares_directly() {
        let prices = PriceColumns {
            high: &[101.0, 101.0],
            low: &[99.0, 99.0],
            close: &[100.0, 100.0],
        };
        let out = average_direction(
            &[100.0, 90.0],
            &[100.0, 95.0],
            &prices,
            &in_session(2),
            &SessionWindow::default(),
        );
        assert_eq!(out, vec![0.0, -1.0]);
    }

    #[test]
    fn average_direction_flips_on_expansion() {
        // calm bars then a large move: ATR(3) is 0 during warmup and ATR(10)
        // is 0 too, so the two-row close change alone opens the gate
        let close = [100.0, 100.0, 100.0, 120.0];
        let prices = PriceColumns {
            high: &close,
            low: &close,
            close: &close,
        };
        let out = average_direction(
            &[100.0, 100.0, 100.0, 120.0],
            &[101.0, 101.0, 101.0, 101.0],
            &prices,
            &in_session(4),
            &SessionWindow::default(),
        );
        assert_eq!(out, vec![0.0, -1.0, -1.0, 1.0]);
    }

    #[test]
    fn average_direction_hold_gate_uses_unrounded_mean() {
        // every true range is 5, so at row 5 the gate is (5 + 5) / 6 = 1.6667;
        // a 1.668 move clears it where a 1.67 gate would hold -1
        let prices = PriceColumns {
            high: &[102.5; 6],
            low: &[97.5; 6],
            close: &[100.0; 6],
        };
        let out = average_direction(
            &[100.0, 99.0, 99.0, 98.332, 98.0, 100.0],
            &[99.9; 6],
            &prices,
            &in_session(6),
            &SessionWindow::default(),
        );
        assert_eq!(out, vec![0.0, -1.0, -1.0, -1.0, -1.0, 1.0]);
    }
}
