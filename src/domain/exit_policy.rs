//! Exit policies for an open position.
//!
//! Two alternatives sit behind [`ExitPolicy`]:
//!
//! - `MfeCapture` (default): before the best unrealized profit (MFE) reaches
//!   the activation threshold, any raw exit signal closes the trade. From the
//!   threshold on, the trade closes when the signal has held for
//!   `confirm_bars` consecutive bars, or when it has given back at least
//!   `1 - capture_ratio` of its MFE.
//! - `TrailingStop`: ratcheting stop behind price once MFE reaches the
//!   activation points, a breakeven stop, a fixed profit target and an
//!   ATR-capped stop loss. Any raw exit signal also closes the trade.

use crate::domain::event::ExitReason;
use crate::domain::position::Side;

/// Stop loss is capped at this many general ATRs.
const STOP_LOSS_ATR_MULTIPLE: f64 = 4.5;

#[derive(Debug, Clone, PartialEq)]
pub struct MfeCaptureConfig {
    pub activation_mfe: f64,
    pub capture_ratio: f64,
    pub confirm_bars: u32,
    /// Profit at or below which the raw exit signal fires. `None` disables it.
    pub fixed_stop_loss: Option<f64>,
}

impl Default for MfeCaptureConfig {
    fn default() -> Self {
        MfeCaptureConfig {
            activation_mfe: 12.0,
            capture_ratio: 0.4,
            confirm_bars: 1,
            fixed_stop_loss: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailingStopConfig {
    pub activation_points: f64,
    pub distance_points: f64,
    pub use_atr: bool,
    pub atr_multiplier: f64,
    pub use_breakeven: bool,
    pub breakeven_points: f64,
    pub capture_points: f64,
    pub stop_loss_points: f64,
}

impl Default for TrailingStopConfig {
    fn default() -> Self {
        TrailingStopConfig {
            activation_points: 10.0,
            distance_points: 10.0,
            use_atr: true,
            atr_multiplier: 0.55,
            use_breakeven: true,
            breakeven_points: 10.0,
            capture_points: 100.0,
            stop_loss_points: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExitPolicy {
    MfeCapture(MfeCaptureConfig),
    TrailingStop(TrailingStopConfig),
}

impl Default for ExitPolicy {
    fn default() -> Self {
        ExitPolicy::MfeCapture(MfeCaptureConfig::default())
    }
}

/// Per-bar inputs to an exit decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitInputs {
    pub close: f64,
    pub raw_signal: bool,
    /// ATR used for the trailing distance.
    pub atr: f64,
    /// ATR used to cap the stop loss.
    pub general_atr: f64,
}

/// Per-trade exit state. Reset on every entry and exit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExitTracker {
    pub side: Option<Side>,
    pub entry_price: f64,
    pub current_price: f64,
    pub mfe: f64,
    pub bars_in_trade: u32,
    pub raw_signal: bool,
    pub signal_streak: u32,
    pub trailing_stop: Option<f64>,
    pub breakeven_active: bool,
}

impl ExitTracker {
    pub fn start(&mut self, side: Side, entry_price: f64) {
        *self = ExitTracker {
            side: Some(side),
            entry_price,
            current_price: entry_price,
            ..ExitTracker::default()
        };
    }

    pub fn reset(&mut self) {
        *self = ExitTracker::default();
    }

    /// Record a bar and return the current profit.
    fn observe(&mut self, side: Side, inputs: &ExitInputs) -> f64 {
        self.current_price = inputs.close;
        self.raw_signal = inputs.raw_signal;
        self.bars_in_trade += 1;
        let profit = side.profit(self.entry_price, inputs.close);
        self.mfe = self.mfe.max(profit);
        profit
    }
}

impl ExitPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ExitPolicy::MfeCapture(_) => "mfe_capture",
            ExitPolicy::TrailingStop(_) => "trailing_stop",
        }
    }

    /// Whether the fixed stop loss contributes to the raw exit signal.
    pub fn fixed_stop_hit(&self, profit: f64) -> bool {
        match self {
            ExitPolicy::MfeCapture(cfg) => cfg.fixed_stop_loss.is_some_and(|sl| profit <= sl),
            ExitPolicy::TrailingStop(_) => false,
        }
    }

    /// Decide whether the open trade closes on this bar.
    pub fn evaluate(&self, tracker: &mut ExitTracker, inputs: &ExitInputs) -> Option<ExitReason> {
        let side = tracker.side?;
        match self {
            ExitPolicy::MfeCapture(cfg) => mfe_capture(cfg, tracker, side, inputs),
            ExitPolicy::TrailingStop(cfg) => trailing_stop(cfg, tracker, side, inputs),
        }
    }
}

fn mfe_capture(
    cfg: &MfeCaptureConfig,
    tracker: &mut ExitTracker,
    side: Side,
    inputs: &ExitInputs,
) -> Option<ExitReason> {
    let profit = tracker.observe(side, inputs);
    if inputs.raw_signal {
        tracker.signal_streak += 1;
    } else {
        tracker.signal_streak = 0;
    }

    let exit = if tracker.mfe < cfg.activation_mfe {
        inputs.raw_signal
    } else {
        let confirmed = inputs.raw_signal && tracker.signal_streak >= cfg.confirm_bars.max(1);
        let degraded = tracker.mfe - profit >= tracker.mfe * (1.0 - cfg.capture_ratio);
        confirmed || degraded
    };

    if !exit {
        return None;
    }
    let fixed_stop = cfg.fixed_stop_loss.is_some_and(|sl| profit <= sl);
    Some(if fixed_stop {
        ExitReason::StopLoss
    } else {
        ExitReason::Signal
    })
}

fn trailing_stop(
    cfg: &TrailingStopConfig,
    tracker: &mut ExitTracker,
    side: Side,
    inputs: &ExitInputs,
) -> Option<ExitReason> {
    let profit = tracker.observe(side, inputs);
    let close = inputs.close;

    let distance = if cfg.use_atr && inputs.atr > 0.0 {
        inputs.atr * cfg.atr_multiplier
    } else {
        cfg.distance_points
    };

    // A stop is tighter when it sits closer to price on the protected side.
    let tighter = |candidate: f64, current: f64| match side {
        Side::Buy => candidate > current,
        Side::Sell => candidate < current,
    };

    if tracker.mfe >= cfg.activation_points {
        let candidate = close - side.sign() * distance;
        if tracker.trailing_stop.is_none_or(|stop| tighter(candidate, stop)) {
            tracker.trailing_stop = Some(candidate);
        }
    }

    if cfg.use_breakeven && !tracker.breakeven_active && tracker.mfe >= cfg.breakeven_points {
        let entry = tracker.entry_price;
        tracker.trailing_stop = Some(match tracker.trailing_stop {
            Some(stop) if tighter(stop, entry) => stop,
            _ => entry,
        });
        tracker.breakeven_active = true;
    }

    let stop_hit = tracker.trailing_stop.is_some_and(|stop| match side {
        Side::Buy => close <= stop,
        Side::Sell => close >= stop,
    });
    let stop_loss_points = cfg
        .stop_loss_points
        .min(inputs.general_atr * STOP_LOSS_ATR_MULTIPLE);

    if profit >= cfg.capture_points {
        Some(ExitReason::ProfitTarget)
    } else if profit <= -stop_loss_points {
        Some(ExitReason::StopLoss)
    } else if stop_hit {
        Some(ExitReason::TrailingStop)
    } else if inputs.raw_signal {
        Some(ExitReason::Signal)
    } else {
        None
    }
}
