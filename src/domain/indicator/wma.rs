//! Weighted Moving Average.
//!
//! WMA(n)[i] = (1*S[i-n+1] + 2*S[i-n+2] + ... + n*S[i]) / (n*(n+1)/2), ceiled.
//! Each window is summed directly so the ceiling never sees sliding-sum drift.
//! Warmup: first (n-1) rows are 0.

pub fn wma(source: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![0.0; source.len()];
    if period == 0 {
        return values;
    }

    let p = period as f64;
    let divisor = p * (p + 1.0) / 2.0;
    for i in period - 1..source.len() {
        let window = &source[i + 1 - period..=i];
        let weighted_sum: f64 = window
            .iter()
            .enumerate()
            .map(|(j, v)| (j + 1) as f64 * v)
            .sum();
        values[i] = (weighted_sum / divisor).ceil();
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wma_warmup_is_zero() {
        let out = wma(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert!(out[2] > 0.0);
    }

    #[test]
    fn wma_newest_row_has_largest_weight() {
        // (1*10 + 2*20 + 3*30) / 6 = 23.33 -> 24
        let out = wma(&[10.0, 20.0, 30.0], 3);
        assert!((out[2] - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wma_sliding_window() {
        // (1*20 + 2*30 + 3*40) / 6 = 33.33 -> 34
        let out = wma(&[10.0, 20.0, 30.0, 40.0], 3);
        assert!((out[3] - 34.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wma_ceils_not_rounds() {
        // (1*1 + 2*1 + 3*2) / 6 = 1.5 -> 2, and (1*1 + 2*2 + 3*1) / 6 = 1.33 -> 2
        assert!((wma(&[1.0, 1.0, 2.0], 3)[2] - 2.0).abs() < f64::EPSILON);
        assert!((wma(&[1.0, 2.0, 1.0], 3)[2] - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wma_period_1_is_ceiled_source() {
        let out = wma(&[10.2, 20.0, 30.7], 1);
        assert_eq!(out, vec![11.0, 20.0, 31.0]);
    }

    #[test]
    fn wma_shorter_than_period_is_all_zero() {
        assert_eq!(wma(&[5.0, 6.0], 3), vec![0.0, 0.0]);
    }

    #[test]
    fn wma_huge_period_does_not_overflow() {
        assert_eq!(wma(&[1.0, 2.0], usize::MAX), vec![0.0, 0.0]);
    }

    #[test]
    fn wma_empty_and_period_0() {
        assert!(wma(&[], 3).is_empty());
        assert_eq!(wma(&[10.0, 20.0], 0), vec![0.0, 0.0]);
    }

    proptest! {
        #[test]
        fn wma_matches_direct_weighted_sum(
            source in prop::collection::vec(0.0f64..1000.0, 1..60),
            period in 1usize..12,
        ) {
            let out = wma(&source, period);
            prop_assert_eq!(out.len(), source.len());
            let divisor = (period * (period + 1)) as f64 / 2.0;
            for i in 0..source.len() {
                if i + 1 < period {
                    prop_assert_eq!(out[i], 0.0);
                } else {
                    let start = i + 1 - period;
                    let sum: f64 = (0..period)
                        .map(|j| (j + 1) as f64 * source[start + j])
                        .sum();
                    prop_assert_eq!(out[i], (sum / divisor).ceil());
                }
            }
        }
    }
}
