//! Running trade statistics.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::event::ExitReason;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub net_profit: f64,
    pub gross_profit: f64,
    /// Sum of losing trade profits, zero or negative.
    pub gross_loss: f64,
    /// Running maximum of cumulative net profit, starting from zero.
    pub peak_profit: f64,
    pub max_drawdown: f64,
    /// Largest single-trade profit.
    pub max_profit: f64,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
    /// `win_rate * avg_win - (1 - win_rate) * avg_loss`, refreshed per trade.
    pub expectancy: f64,
}

impl Stats {
    /// Fold one closed trade into the statistics.
    pub fn record(&mut self, profit: f64, reason: ExitReason) {
        self.total_trades += 1;
        self.net_profit += profit;

        if profit > 0.0 {
            self.winning_trades += 1;
            self.gross_profit += profit;
        } else if profit < 0.0 {
            self.losing_trades += 1;
            self.gross_loss += profit;
        } else {
            self.breakeven_trades += 1;
        }

        self.peak_profit = self.peak_profit.max(self.net_profit);
        self.max_drawdown = self.max_drawdown.max(self.peak_profit - self.net_profit);
        self.max_profit = self.max_profit.max(profit);
        *self.exit_reasons.entry(reason).or_insert(0) += 1;

        let win_rate = self.win_rate();
        self.expectancy = win_rate * self.avg_win() - (1.0 - win_rate) * self.avg_loss();
    }

    pub fn win_rate(&self) -> f64 {
        if self.total_trades == 0 {
            0.0
        } else {
            self.winning_trades as f64 / self.total_trades as f64
        }
    }

    pub fn avg_win(&self) -> f64 {
        if self.winning_trades == 0 {
            0.0
        } else {
            self.gross_profit / self.winning_trades as f64
        }
    }

    /// Average losing trade as a positive magnitude.
    pub fn avg_loss(&self) -> f64 {
        if self.losing_trades == 0 {
            0.0
        } else {
            -self.gross_loss / self.losing_trades as f64
        }
    }

    pub fn avg_profit(&self) -> f64 {
        if self.total_trades == 0 {
            0.0
        } else {
            self.net_profit / self.total_trades as f64
        }
    }

    /// Gross profit over gross loss magnitude; 0 when there are no losses.
    pub fn profit_factor(&self) -> f64 {
        if self.gross_loss == 0.0 {
            0.0
        } else {
            self.gross_profit / -self.gross_loss
        }
    }

    pub fn exits(&self, reason: ExitReason) -> usize {
        self.exit_reasons.get(&reason).copied().unwrap_or(0)
    }
}

/// Multi-line summary block.
impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_trades == 0 {
            return writeln!(f, "no trades executed");
        }
        writeln!(f, "Total Trades:      {}", self.total_trades)?;
        writeln!(
            f,
            "Winning Trades:    {} ({:.2}%)",
            self.winning_trades,
            self.win_rate() * 100.0
        )?;
        writeln!(f, "Losing Trades:     {}", self.losing_trades)?;
        writeln!(f, "Breakeven Trades:  {}", self.breakeven_trades)?;
        writeln!(f, "Net Profit:        {:.2} pts", self.net_profit)?;
        writeln!(f, "Gross Profit:      {:.2} pts", self.gross_profit)?;
        writeln!(f, "Gross Loss:        {:.2} pts", self.gross_loss)?;
        writeln!(f, "Avg Profit/Trade:  {:.2} pts", self.avg_profit())?;
        writeln!(f, "Profit Factor:     {:.2}", self.profit_factor())?;
        writeln!(f, "Expectancy:        {:.2} pts/trade", self.expectancy)?;
        writeln!(f, "Max Drawdown:      {:.2} pts", self.max_drawdown)?;
        writeln!(f, "Max Single Profit: {:.2} pts", self.max_profit)?;
        writeln!(f, "Exit Reasons:")?;
        for reason in ExitReason::ALL {
            writeln!(f, "  {:<16} {}", reason.as_str(), self.exits(reason))?;
        }
        Ok(())
    }
}
