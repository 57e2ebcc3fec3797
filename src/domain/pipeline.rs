//! Indicator pipeline.
//!
//! Runs the fixed transform chain over a [`SeriesStore`], appending one derived
//! column per step. Each step reads only columns written by earlier steps:
//!
//! ```text
//! OHLC -> atr, direction_atr, general_atr
//! OHLC -> cci
//! atr -> scale_wma
//! close, cci, scale_wma -> {fast,slow}_envelope -> {fast,slow}_envelope_ema
//! {fast,slow}_envelope_ema -> {fast,slow}_trend
//! trends | envelope averages -> {fast,slow}_direction
//! ```

use std::time::Instant;

use tracing::{debug, info};

use crate::domain::error::TrendswapError;
use crate::domain::indicator::direction::{PriceColumns, average_direction, kalman_direction};
use crate::domain::indicator::{atr, cci, ema, envelope, spectral, wma};
use crate::domain::series::{ColumnId, SeriesStore};
use crate::domain::session::SessionWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionMode {
    /// Consecutive Kalman trend values against a multiple of a short ATR.
    Kalman,
    /// Envelope EMA against its SMA, gated by price ATR expansion.
    Average,
}

impl DirectionMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "kalman" => Some(DirectionMode::Kalman),
            "average" => Some(DirectionMode::Average),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub cci_period: usize,
    pub atr_period: usize,
    pub scale_wma_period: usize,
    pub fast_envelope_k: f64,
    pub slow_envelope_k: f64,
    pub fast_ema_period: usize,
    pub slow_ema_period: usize,
    pub fast_kalman_window: usize,
    pub fast_kalman_cutoff: usize,
    pub slow_kalman_window: usize,
    pub slow_kalman_cutoff: usize,
    pub direction_atr_period: usize,
    pub fast_direction_factor: f64,
    pub slow_direction_factor: f64,
    pub general_atr_period: usize,
    pub direction_mode: DirectionMode,
    pub reference_sma_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            cci_period: 2,
            atr_period: 5,
            scale_wma_period: 30,
            fast_envelope_k: 0.1,
            slow_envelope_k: 0.1,
            fast_ema_period: 3,
            slow_ema_period: 3,
            fast_kalman_window: 2,
            fast_kalman_cutoff: 2,
            slow_kalman_window: 64,
            slow_kalman_cutoff: 128,
            direction_atr_period: 2,
            fast_direction_factor: 0.25,
            slow_direction_factor: 0.3,
            general_atr_period: 3,
            direction_mode: DirectionMode::Kalman,
            reference_sma_period: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    config: IndicatorConfig,
    session: SessionWindow,
}

impl IndicatorPipeline {
    pub fn new(config: IndicatorConfig, session: SessionWindow) -> Self {
        IndicatorPipeline { config, session }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionWindow {
        &self.session
    }

    /// Append every derived column to `store`.
    pub fn run(&self, store: &mut SeriesStore) -> Result<(), TrendswapError> {
        if store.is_empty() {
            return Err(TrendswapError::EmptySeries {
                transform: "pipeline",
            });
        }
        let started = Instant::now();
        let cfg = &self.config;

        for (column, period) in [
            (ColumnId::Atr, cfg.atr_period),
            (ColumnId::DirectionAtr, cfg.direction_atr_period),
            (ColumnId::GeneralAtr, cfg.general_atr_period),
        ] {
            step(store, column, |s| {
                let high = s.require("atr", ColumnId::High)?;
                let low = s.require("atr", ColumnId::Low)?;
                let close = s.require("atr", ColumnId::Close)?;
                Ok(atr::atr(high, low, close, period))
            })?;
        }

        step(store, ColumnId::Cci, |s| {
            Ok(cci::cci(
                s.require("cci", ColumnId::Open)?,
                s.require("cci", ColumnId::High)?,
                s.require("cci", ColumnId::Low)?,
                s.require("cci", ColumnId::Close)?,
                cfg.cci_period,
            ))
        })?;

        step(store, ColumnId::ScaleWma, |s| {
            Ok(wma::wma(s.require("wma", ColumnId::Atr)?, cfg.scale_wma_period))
        })?;

        for (column, k) in [
            (ColumnId::FastEnvelope, cfg.fast_envelope_k),
            (ColumnId::SlowEnvelope, cfg.slow_envelope_k),
        ] {
            step(store, column, |s| {
                Ok(envelope::envelope(
                    s.require("envelope", ColumnId::Close)?,
                    s.require("envelope", ColumnId::Cci)?,
                    s.require("envelope", ColumnId::ScaleWma)?,
                    k,
                ))
            })?;
        }

        for (column, source, period) in [
            (
                ColumnId::FastEnvelopeEma,
                ColumnId::FastEnvelope,
                cfg.fast_ema_period,
            ),
            (
                ColumnId::SlowEnvelopeEma,
                ColumnId::SlowEnvelope,
                cfg.slow_ema_period,
            ),
        ] {
            step(store, column, |s| {
                Ok(ema::ema(s.require("ema", source)?, period))
            })?;
        }

        for (column, source, window, cutoff) in [
            (
                ColumnId::FastTrend,
                ColumnId::FastEnvelopeEma,
                cfg.fast_kalman_window,
                cfg.fast_kalman_cutoff,
            ),
            (
                ColumnId::SlowTrend,
                ColumnId::SlowEnvelopeEma,
                cfg.slow_kalman_window,
                cfg.slow_kalman_cutoff,
            ),
        ] {
            step(store, column, |s| {
                Ok(spectral::kalman_trend(
                    s.require("kalman", source)?,
                    window,
                    cutoff,
                ))
            })?;
        }

        match cfg.direction_mode {
            DirectionMode::Kalman => self.kalman_directions(store)?,
            DirectionMode::Average => self.average_directions(store)?,
        }

        info!(
            rows = store.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "indicator pipeline complete"
        );
        Ok(())
    }

    fn kalman_directions(&self, store: &mut SeriesStore) -> Result<(), TrendswapError> {
        for (column, source, factor) in [
            (
                ColumnId::FastDirection,
                ColumnId::FastTrend,
                self.config.fast_direction_factor,
            ),
            (
                ColumnId::SlowDirection,
                ColumnId::SlowTrend,
                self.config.slow_direction_factor,
            ),
        ] {
            step(store, column, |s| {
                Ok(kalman_direction(
                    s.require("direction", source)?,
                    s.require("direction", ColumnId::DirectionAtr)?,
                    factor,
                    s.timestamps(),
                    &self.session,
                ))
            })?;
        }
        Ok(())
    }

    fn average_directions(&self, store: &mut SeriesStore) -> Result<(), TrendswapError> {
        let period = self.config.reference_sma_period;
        for (column, source) in [
            (ColumnId::FastEnvelopeSma, ColumnId::FastEnvelope),
            (ColumnId::SlowEnvelopeSma, ColumnId::SlowEnvelope),
        ] {
            step(store, column, |s| {
                Ok(ema::sma(s.require("sma", source)?, period))
            })?;
        }

        for (column, source, average) in [
            (
                ColumnId::FastDirection,
                ColumnId::FastEnvelopeEma,
                ColumnId::FastEnvelopeSma,
            ),
            (
                ColumnId::SlowDirection,
                ColumnId::SlowEnvelopeEma,
                ColumnId::SlowEnvelopeSma,
            ),
        ] {
            step(store, column, |s| {
                let prices = PriceColumns {
                    high: s.require("direction", ColumnId::High)?,
                    low: s.require("direction", ColumnId::Low)?,
                    close: s.require("direction", ColumnId::Close)?,
                };
                Ok(average_direction(
                    s.require("direction", source)?,
                    s.require("direction", average)?,
                    &prices,
                    s.timestamps(),
                    &self.session,
                ))
            })?;
        }
        Ok(())
    }
}

fn step<F>(store: &mut SeriesStore, column: ColumnId, compute: F) -> Result<(), TrendswapError>
where
    F: FnOnce(&SeriesStore) -> Result<Vec<f64>, TrendswapError>,
{
    let started = Instant::now();
    let values = compute(&*store)?;
    store.insert(column, values)?;
    debug!(
        %column,
        elapsed_us = started.elapsed().as_micros() as u64,
        "transform applied"
    );
    Ok(())
}
