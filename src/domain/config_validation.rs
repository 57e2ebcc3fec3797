//! Configuration loading and validation.
//!
//! Reads every section through a [`ConfigPort`] and rejects bad values before
//! any bar is processed.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::engine::EngineConfig;
use crate::domain::error::TrendswapError;
use crate::domain::exit_policy::{ExitPolicy, MfeCaptureConfig, TrailingStopConfig};
use crate::domain::pipeline::{DirectionMode, IndicatorConfig};
use crate::domain::session::SessionWindow;
use crate::ports::config_port::ConfigPort;

/// Bar source and inclusive date filter from `[data]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataConfig {
    pub bars: Option<PathBuf>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Everything a run needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub data: DataConfig,
    pub indicators: IndicatorConfig,
    pub engine: EngineConfig,
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn session(&self) -> SessionWindow {
        self.engine.session
    }
}

pub fn load_run_config(config: &dyn ConfigPort) -> Result<RunConfig, TrendswapError> {
    let session = session_window(config)?;
    Ok(RunConfig {
        data: data_config(config)?,
        indicators: indicator_config(config)?,
        engine: engine_config(config, session)?,
        output_dir: PathBuf::from(config.get_string_or("report", "output_dir", ".")),
    })
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TrendswapError> {
    load_run_config(config).map(|_| ())
}

pub fn indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, TrendswapError> {
    const S: &str = "indicators";
    let d = IndicatorConfig::default();

    let direction_mode = match config.get_string(S, "direction_mode") {
        None => d.direction_mode,
        Some(name) => DirectionMode::parse(&name).ok_or_else(|| {
            TrendswapError::invalid(
                S,
                "direction_mode",
                format!("unknown direction mode '{name}', expected kalman or average"),
            )
        })?,
    };

    Ok(IndicatorConfig {
        cci_period: period(config, S, "cci_period", d.cci_period)?,
        atr_period: period(config, S, "atr_period", d.atr_period)?,
        scale_wma_period: period(config, S, "scale_wma_period", d.scale_wma_period)?,
        fast_envelope_k: finite(config, S, "fast_envelope_k", d.fast_envelope_k)?,
        slow_envelope_k: finite(config, S, "slow_envelope_k", d.slow_envelope_k)?,
        fast_ema_period: period(config, S, "fast_ema_period", d.fast_ema_period)?,
        slow_ema_period: period(config, S, "slow_ema_period", d.slow_ema_period)?,
        fast_kalman_window: period(config, S, "fast_kalman_window", d.fast_kalman_window)?,
        fast_kalman_cutoff: period(config, S, "fast_kalman_cutoff", d.fast_kalman_cutoff)?,
        slow_kalman_window: period(config, S, "slow_kalman_window", d.slow_kalman_window)?,
        slow_kalman_cutoff: period(config, S, "slow_kalman_cutoff", d.slow_kalman_cutoff)?,
        direction_atr_period: period(config, S, "direction_atr_period", d.direction_atr_period)?,
        fast_direction_factor: non_negative(
            config,
            S,
            "fast_direction_factor",
            d.fast_direction_factor,
        )?,
        slow_direction_factor: non_negative(
            config,
            S,
            "slow_direction_factor",
            d.slow_direction_factor,
        )?,
        general_atr_period: period(config, S, "general_atr_period", d.general_atr_period)?,
        direction_mode,
        reference_sma_period: period(config, S, "reference_sma_period", d.reference_sma_period)?,
    })
}

pub fn session_window(config: &dyn ConfigPort) -> Result<SessionWindow, TrendswapError> {
    SessionWindow::parse(
        &config.get_string_or("session", "start", "09:17"),
        &config.get_string_or("session", "end", "15:25"),
        &config.get_string_or("session", "utc_offset", "+05:30"),
    )
}

pub fn engine_config(
    config: &dyn ConfigPort,
    session: SessionWindow,
) -> Result<EngineConfig, TrendswapError> {
    const S: &str = "engine";
    let d = EngineConfig::default();

    let deviation_low = finite(config, S, "deviation_low", d.deviation_low)?;
    let deviation_high = finite(config, S, "deviation_high", d.deviation_high)?;
    if deviation_low < 0.0 {
        return Err(TrendswapError::invalid(
            S,
            "deviation_low",
            "deviation_low must be non-negative",
        ));
    }
    if deviation_low > deviation_high {
        return Err(TrendswapError::invalid(
            S,
            "deviation_high",
            "deviation_high must not be below deviation_low",
        ));
    }

    let exit_policy = match config.get_string_or(S, "exit_policy", "mfe_capture").trim() {
        "mfe_capture" => ExitPolicy::MfeCapture(mfe_capture_config(config)?),
        "trailing_stop" => ExitPolicy::TrailingStop(trailing_stop_config(config)?),
        other => {
            return Err(TrendswapError::invalid(
                S,
                "exit_policy",
                format!("unknown exit policy '{other}', expected mfe_capture or trailing_stop"),
            ));
        }
    };

    Ok(EngineConfig {
        deviation_low,
        deviation_high,
        exit_policy,
        session,
    })
}

fn mfe_capture_config(config: &dyn ConfigPort) -> Result<MfeCaptureConfig, TrendswapError> {
    const S: &str = "engine";
    let d = MfeCaptureConfig::default();

    let capture_ratio = finite(config, S, "capture_ratio", d.capture_ratio)?;
    if !(0.0..=1.0).contains(&capture_ratio) {
        return Err(TrendswapError::invalid(
            S,
            "capture_ratio",
            "capture_ratio must be between 0 and 1",
        ));
    }
    let confirm_bars = config.get_int(S, "confirm_bars", i64::from(d.confirm_bars))?;
    let confirm_bars = u32::try_from(confirm_bars)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            TrendswapError::invalid(S, "confirm_bars", "confirm_bars must be a positive integer")
        })?;

    let fixed_stop_loss = if config.get_bool(S, "fixed_stop_loss_enabled", false)? {
        Some(finite(config, S, "fixed_stop_loss", -50.0)?)
    } else {
        None
    };

    Ok(MfeCaptureConfig {
        activation_mfe: non_negative(config, S, "activation_mfe", d.activation_mfe)?,
        capture_ratio,
        confirm_bars,
        fixed_stop_loss,
    })
}

fn trailing_stop_config(config: &dyn ConfigPort) -> Result<TrailingStopConfig, TrendswapError> {
    const S: &str = "trailing";
    let d = TrailingStopConfig::default();
    Ok(TrailingStopConfig {
        activation_points: non_negative(config, S, "activation_points", d.activation_points)?,
        distance_points: non_negative(config, S, "distance_points", d.distance_points)?,
        use_atr: config.get_bool(S, "use_atr", d.use_atr)?,
        atr_multiplier: non_negative(config, S, "atr_multiplier", d.atr_multiplier)?,
        use_breakeven: config.get_bool(S, "use_breakeven", d.use_breakeven)?,
        breakeven_points: non_negative(config, S, "breakeven_points", d.breakeven_points)?,
        capture_points: non_negative(config, S, "capture_points", d.capture_points)?,
        stop_loss_points: non_negative(config, S, "stop_loss_points", d.stop_loss_points)?,
    })
}

pub fn data_config(config: &dyn ConfigPort) -> Result<DataConfig, TrendswapError> {
    let start_date = date(config, "start_date")?;
    let end_date = date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(TrendswapError::invalid(
                "data",
                "start_date",
                "start_date must be before or equal to end_date",
            ));
        }
    }
    Ok(DataConfig {
        bars: config.get_string("data", "bars").map(PathBuf::from),
        start_date,
        end_date,
    })
}

fn date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, TrendswapError> {
    config
        .get_string("data", key)
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                TrendswapError::invalid("data", key, format!("invalid date format: {raw}"))
            })
        })
        .transpose()
}

fn period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TrendswapError> {
    let default = i64::try_from(default).unwrap_or(i64::MAX);
    let value = config.get_int(section, key, default)?;
    usize::try_from(value)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            TrendswapError::invalid(section, key, format!("{key} must be a positive integer"))
        })
}

fn finite(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TrendswapError> {
    let value = config.get_double(section, key, default)?;
    if !value.is_finite() {
        return Err(TrendswapError::invalid(
            section,
            key,
            format!("{key} must be finite"),
        ));
    }
    Ok(value)
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TrendswapError> {
    let value = finite(config, section, key, default)?;
    if value < 0.0 {
        return Err(TrendswapError::invalid(
            section,
            key,
            format!("{key} must be non-negative"),
        ));
    }
    Ok(value)
}
