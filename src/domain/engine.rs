//! Bar-by-bar signal engine.
//!
//! Holds one [`Position`] and its [`ExitTracker`]. Per row it marks the open
//! position to the close, evaluates the raw exit signal and the exit policy,
//! forces an exit outside the session, and only then, if it was already flat
//! at the start of the row, evaluates entry. A row never produces both an
//! EXIT and an ENTRY.

use tracing::debug;

use crate::domain::error::TrendswapError;
use crate::domain::event::{Event, EventKind, ExitReason};
use crate::domain::exit_policy::{ExitInputs, ExitPolicy, ExitTracker};
use crate::domain::position::{Position, Side};
use crate::domain::series::{ColumnId, SeriesStore};
use crate::domain::session::SessionWindow;
use crate::ports::event_port::EventSink;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Inclusive band for |slow_trend - fast_trend| that arms an entry.
    pub deviation_low: f64,
    pub deviation_high: f64,
    pub exit_policy: ExitPolicy,
    pub session: SessionWindow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            deviation_low: 7.0,
            deviation_high: 15.0,
            exit_policy: ExitPolicy::default(),
            session: SessionWindow::default(),
        }
    }
}

/// Entry and flip conditions for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RowSignals {
    buy: bool,
    sell: bool,
    slow_flip: bool,
    fast_flip: bool,
}

struct EngineColumns<'a> {
    close: &'a [f64],
    fast_trend: &'a [f64],
    slow_trend: &'a [f64],
    fast_direction: &'a [f64],
    slow_direction: &'a [f64],
    atr: Option<&'a [f64]>,
    general_atr: Option<&'a [f64]>,
}

#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    position: Position,
    tracker: ExitTracker,
    next_position_id: u64,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Self {
        SignalEngine {
            config,
            position: Position::default(),
            tracker: ExitTracker::default(),
            next_position_id: 1,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn tracker(&self) -> &ExitTracker {
        &self.tracker
    }

    /// Step every row of `store` in order. The sink is left open.
    pub fn run(
        &mut self,
        store: &SeriesStore,
        sink: &mut dyn EventSink,
    ) -> Result<(), TrendswapError> {
        let columns = self.columns(store)?;
        for row in 0..store.len() {
            self.step_row(store, &columns, row, sink)?;
        }
        Ok(())
    }

    /// Step a single row, typically the newest one in forward mode.
    pub fn step(
        &mut self,
        store: &SeriesStore,
        row: usize,
        sink: &mut dyn EventSink,
    ) -> Result<(), TrendswapError> {
        if row >= store.len() {
            return Err(TrendswapError::Data {
                reason: format!("row {row} is past the end of a {}-row store", store.len()),
            });
        }
        let columns = self.columns(store)?;
        self.step_row(store, &columns, row, sink)
    }

    fn columns<'a>(&self, store: &'a SeriesStore) -> Result<EngineColumns<'a>, TrendswapError> {
        let trailing = matches!(self.config.exit_policy, ExitPolicy::TrailingStop(_));
        let optional = |column| {
            if trailing {
                store.require("engine", column).map(Some)
            } else {
                Ok(None)
            }
        };
        Ok(EngineColumns {
            close: store.require("engine", ColumnId::Close)?,
            fast_trend: store.require("engine", ColumnId::FastTrend)?,
            slow_trend: store.require("engine", ColumnId::SlowTrend)?,
            fast_direction: store.require("engine", ColumnId::FastDirection)?,
            slow_direction: store.require("engine", ColumnId::SlowDirection)?,
            atr: optional(ColumnId::Atr)?,
            general_atr: optional(ColumnId::GeneralAtr)?,
        })
    }

    fn signals(&self, columns: &EngineColumns<'_>, row: usize) -> RowSignals {
        let deviation = (columns.slow_trend[row] - columns.fast_trend[row]).abs();
        let deviation_ok =
            deviation >= self.config.deviation_low && deviation <= self.config.deviation_high;

        if row == 0 {
            return RowSignals::default();
        }
        let (slow, slow_prev) = (columns.slow_direction[row], columns.slow_direction[row - 1]);
        let (fast, fast_prev) = (columns.fast_direction[row], columns.fast_direction[row - 1]);

        let slow_flip_up = slow == 1.0 && (slow_prev == 0.0 || slow_prev == -1.0);
        let slow_flip_down = slow == -1.0 && (slow_prev == 0.0 || slow_prev == 1.0);
        let late_buy = fast == 1.0 && fast_prev == -1.0 && slow == 1.0;
        let late_sell = fast == -1.0 && fast_prev == 1.0 && slow == -1.0;

        RowSignals {
            buy: deviation_ok && (slow_flip_up || late_buy),
            sell: deviation_ok && (slow_flip_down || late_sell),
            slow_flip: slow * slow_prev == -1.0,
            fast_flip: fast * fast_prev == -1.0,
        }
    }

    fn step_row(
        &mut self,
        store: &SeriesStore,
        columns: &EngineColumns<'_>,
        row: usize,
        sink: &mut dyn EventSink,
    ) -> Result<(), TrendswapError> {
        let close = columns.close[row];
        let timestamp = store.timestamps()[row];
        let signals = self.signals(columns, row);
        let in_session = self.config.session.is_active(timestamp);

        if let Some(side) = self.position.side {
            let profit = self.position.update(close);
            let opposite_entry = match side {
                Side::Buy => signals.sell,
                Side::Sell => signals.buy,
            };
            let raw_signal = opposite_entry
                || signals.slow_flip
                || signals.fast_flip
                || self.config.exit_policy.fixed_stop_hit(profit);

            let inputs = ExitInputs {
                close,
                raw_signal,
                atr: columns.atr.map_or(0.0, |v| v[row]),
                general_atr: columns.general_atr.map_or(0.0, |v| v[row]),
            };
            let decision = self.config.exit_policy.evaluate(&mut self.tracker, &inputs);

            let reason = match (decision, in_session) {
                (Some(reason), _) => Some(reason),
                (None, false) => Some(ExitReason::Signal),
                (None, true) => None,
            };
            if let Some(reason) = reason {
                self.exit(side, reason, close, row, store, sink)?;
            }
            return Ok(());
        }

        if !in_session {
            return Ok(());
        }
        let side = if signals.buy {
            Side::Buy
        } else if signals.sell {
            Side::Sell
        } else {
            return Ok(());
        };
        self.enter(side, close, row, store, sink)
    }

    fn enter(
        &mut self,
        side: Side,
        price: f64,
        row: usize,
        store: &SeriesStore,
        sink: &mut dyn EventSink,
    ) -> Result<(), TrendswapError> {
        let timestamp = store.timestamps()[row];
        let id = self.next_position_id;
        self.next_position_id += 1;

        self.position.open(id, side, price, timestamp, row);
        self.tracker.start(side, price);

        let event = Event {
            position_id: id,
            side,
            kind: EventKind::Entry,
            price,
            timestamp,
            row,
        };
        debug!(%event, "entry");
        sink.accept(event)
    }

    fn exit(
        &mut self,
        side: Side,
        reason: ExitReason,
        price: f64,
        row: usize,
        store: &SeriesStore,
        sink: &mut dyn EventSink,
    ) -> Result<(), TrendswapError> {
        let event = Event {
            position_id: self.position.id,
            side,
            kind: EventKind::Exit {
                reason,
                peak_profit: self.position.peak_profit,
                peak_loss: self.position.peak_loss,
            },
            price,
            timestamp: store.timestamps()[row],
            row,
        };
        debug!(
            %event,
            profit = self.position.profit,
            profit_pct = self.position.profit_pct(),
            bars = self.tracker.bars_in_trade,
            "exit"
        );
        self.position.reset();
        self.tracker.reset();
        sink.accept(event)
    }
}
