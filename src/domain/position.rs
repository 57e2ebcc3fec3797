//! The single open position held by a signal engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }

    /// Signed profit of a move from `entry` to `price`.
    pub fn profit(self, entry: f64, price: f64) -> f64 {
        self.sign() * (price - entry)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub id: u64,
    pub side: Option<Side>,
    pub entry_price: f64,
    pub entry_time: Option<DateTime<Utc>>,
    pub entry_row: usize,
    pub profit: f64,
    /// Best unrealized profit since entry (MFE).
    pub peak_profit: f64,
    /// Worst unrealized profit since entry (MAE), zero or negative.
    pub peak_loss: f64,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.side.is_none()
    }

    pub fn open(&mut self, id: u64, side: Side, price: f64, time: DateTime<Utc>, row: usize) {
        *self = Position {
            id,
            side: Some(side),
            entry_price: price,
            entry_time: Some(time),
            entry_row: row,
            ..Position::default()
        };
    }

    /// Mark to `close` and extend the excursions. Returns the current profit.
    pub fn update(&mut self, close: f64) -> f64 {
        let Some(side) = self.side else {
            return 0.0;
        };
        self.profit = side.profit(self.entry_price, close);
        self.peak_profit = self.peak_profit.max(self.profit);
        self.peak_loss = self.peak_loss.min(self.profit);
        self.profit
    }

    pub fn profit_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            0.0
        } else {
            self.profit / self.entry_price * 100.0
        }
    }

    pub fn reset(&mut self) {
        *self = Position::default();
    }
}
