//! Pairs ENTRY and EXIT events into closed trades.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::error::TrendswapError;
use crate::domain::event::{Event, EventKind, ExitReason};
use crate::domain::metrics::Stats;
use crate::domain::position::Side;
use crate::ports::event_port::EventSink;

/// One closed trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub position_id: u64,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub profit: f64,
    pub profit_pct: f64,
    pub reason: ExitReason,
    pub peak_profit: f64,
    pub peak_loss: f64,
}

#[derive(Debug, Clone)]
struct PendingEntry {
    position_id: u64,
    side: Side,
    price: f64,
    time: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct TradeAggregator {
    pending: Option<PendingEntry>,
    trades: Vec<TradeRecord>,
    stats: Stats,
    orphan_exits: usize,
}

impl TradeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Exits received with no pending entry.
    pub fn orphan_exits(&self) -> usize {
        self.orphan_exits
    }

    pub fn into_parts(self) -> (Vec<TradeRecord>, Stats) {
        (self.trades, self.stats)
    }

    pub fn on_event(&mut self, event: Event) {
        match event.kind {
            EventKind::Entry => {
                self.pending = Some(PendingEntry {
                    position_id: event.position_id,
                    side: event.side,
                    price: event.price,
                    time: event.timestamp,
                });
            }
            EventKind::Exit {
                reason,
                peak_profit,
                peak_loss,
            } => {
                let Some(entry) = self.pending.take() else {
                    self.orphan_exits += 1;
                    warn!(%event, "exit without a pending entry, ignoring");
                    return;
                };
                let profit = entry.side.profit(entry.price, event.price);
                let profit_pct = if entry.price == 0.0 {
                    0.0
                } else {
                    profit / entry.price * 100.0
                };
                let trade = TradeRecord {
                    position_id: entry.position_id,
                    side: entry.side,
                    entry_price: entry.price,
                    exit_price: event.price,
                    entry_time: entry.time,
                    exit_time: event.timestamp,
                    profit,
                    profit_pct,
                    reason,
                    peak_profit,
                    peak_loss,
                };
                debug!(
                    id = trade.position_id,
                    side = %trade.side,
                    entry = trade.entry_price,
                    exit = trade.exit_price,
                    profit,
                    %reason,
                    "trade closed"
                );
                self.stats.record(profit, reason);
                self.trades.push(trade);
            }
        }
    }

    /// Log the summary block. The ledger and stats stay readable afterwards.
    pub fn finish(&mut self) {
        if self.pending.is_some() {
            debug!("stream closed with an open position");
        }
        for line in self.stats.to_string().lines() {
            info!("{line}");
        }
    }
}

impl EventSink for TradeAggregator {
    fn accept(&mut self, event: Event) -> Result<(), TrendswapError> {
        self.on_event(event);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TrendswapError> {
        self.finish();
        Ok(())
    }
}
