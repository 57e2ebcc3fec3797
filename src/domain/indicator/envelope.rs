//! Adaptive trend envelope.
//!
//! Two bands ride the source at `k * scale`: `dn` above, `up` below. While the
//! oscillator is non-negative the lower band `up` is a ratchet that never falls;
//! while it is non-positive the upper band `dn` never rises. An oscillator
//! crossing snaps the newly active band to the other band's previous value.
//! The output follows whichever band is active, rounded to 3 decimals.

use crate::domain::indicator::round_to;

pub fn envelope(source: &[f64], cci: &[f64], scale: &[f64], k: f64) -> Vec<f64> {
    let len = source.len().min(cci.len()).min(scale.len());
    if len == 0 {
        return Vec::new();
    }

    let mut dn: Vec<f64> = (0..len).map(|i| source[i] + k * scale[i]).collect();
    let mut up: Vec<f64> = (0..len).map(|i| source[i] - k * scale[i]).collect();
    let mut values = vec![0.0; len];
    values[0] = round_to(source[0], 3);

    for i in 1..len {
        if cci[i] >= 0.0 && cci[i - 1] < 0.0 {
            up[i] = dn[i - 1];
        }
        if cci[i] <= 0.0 && cci[i - 1] > 0.0 {
            dn[i] = up[i - 1];
        }

        if cci[i] >= 0.0 {
            up[i] = up[i].max(up[i - 1]);
        } else if cci[i] <= 0.0 {
            dn[i] = dn[i].min(dn[i - 1]);
        }

        values[i] = if cci[i] >= 0.0 {
            round_to(up[i], 3)
        } else if cci[i] <= 0.0 {
            round_to(dn[i], 3)
        } else {
            // NaN oscillator
            values[i - 1]
        };
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_row_is_rounded_source() {
        let out = envelope(&[100.12345], &[1.0], &[10.0], 0.1);
        assert_relative_eq!(out[0], 100.123);
    }

    #[test]
    fn positive_oscillator_ratchets_lower_band_up() {
        let source = [100.0, 110.0, 105.0, 120.0];
        let cci = [50.0, 50.0, 50.0, 50.0];
        let scale = [10.0; 4];
        let out = envelope(&source, &cci, &scale, 1.0);
        // up = source - 10, never decreasing while cci >= 0
        assert_relative_eq!(out[1], 100.0);
        assert_relative_eq!(out[2], 100.0);
        assert_relative_eq!(out[3], 110.0);
    }

    #[test]
    fn negative_oscillator_ratchets_upper_band_down() {
        let source = [100.0, 90.0, 95.0, 80.0];
        let cci = [-50.0; 4];
        let scale = [10.0; 4];
        let out = envelope(&source, &cci, &scale, 1.0);
        // dn = source + 10, never increasing while cci < 0
        assert_relative_eq!(out[1], 100.0);
        assert_relative_eq!(out[2], 100.0);
        assert_relative_eq!(out[3], 90.0);
    }

    #[test]
    fn upward_cross_snaps_lower_band_to_previous_upper() {
        let source = [100.0, 100.0, 100.0];
        let cci = [-50.0, -50.0, 50.0];
        let scale = [10.0; 3];
        let out = envelope(&source, &cci, &scale, 1.0);
        assert_relative_eq!(out[1], 110.0);
        // up[2] = dn[1] = 110, then max(110, up[1] = 90)
        assert_relative_eq!(out[2], 110.0);
    }

    #[test]
    fn downward_cross_snaps_upper_band_to_previous_lower() {
        let source = [100.0, 100.0, 100.0];
        let cci = [50.0, 50.0, -50.0];
        let scale = [10.0; 3];
        let out = envelope(&source, &cci, &scale, 1.0);
        assert_relative_eq!(out[1], 90.0);
        // dn[2] = up[1] = 90, then min(90, dn[1] = 110)
        assert_relative_eq!(out[2], 90.0);
    }

    #[test]
    fn zero_oscillator_prefers_lower_band() {
        let out = envelope(&[100.0, 100.0], &[0.0, 0.0], &[10.0, 10.0], 1.0);
        assert_relative_eq!(out[1], 90.0);
    }

    #[test]
    fn empty_source() {
        assert!(envelope(&[], &[], &[], 0.1).is_empty());
    }
}
