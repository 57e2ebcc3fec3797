//! Events emitted by the signal engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::position::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    ProfitTarget,
    StopLoss,
    TrailingStop,
    Signal,
}

impl ExitReason {
    pub const ALL: [ExitReason; 4] = [
        ExitReason::ProfitTarget,
        ExitReason::StopLoss,
        ExitReason::TrailingStop,
        ExitReason::Signal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::ProfitTarget => "PROFIT_TARGET",
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TrailingStop => "TRAILING_STOP",
            ExitReason::Signal => "SIGNAL",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Entry,
    Exit {
        reason: ExitReason,
        peak_profit: f64,
        peak_loss: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub position_id: u64,
    pub side: Side,
    pub kind: EventKind,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    /// Row of the series store the event was produced on.
    pub row: usize,
}

impl Event {
    pub fn is_entry(&self) -> bool {
        matches!(self.kind, EventKind::Entry)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.kind, EventKind::Exit { .. })
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self.kind {
            EventKind::Exit { reason, .. } => Some(reason),
            EventKind::Entry => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::Entry => write!(
                f,
                "#{} {} ENTRY @ {:.2} [{}]",
                self.position_id, self.side, self.price, self.timestamp
            ),
            EventKind::Exit { reason, .. } => write!(
                f,
                "#{} {} EXIT @ {:.2} ({}) [{}]",
                self.position_id, self.side, self.price, reason, self.timestamp
            ),
        }
    }
}
