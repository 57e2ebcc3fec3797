//! Report output port.

use crate::domain::aggregator::TradeRecord;
use crate::domain::error::TrendswapError;
use crate::domain::metrics::Stats;
use crate::domain::series::SeriesStore;

pub trait ReportPort {
    fn write_trades(&self, trades: &[TradeRecord]) -> Result<(), TrendswapError>;

    fn write_series(&self, store: &SeriesStore) -> Result<(), TrendswapError>;

    fn write_summary(&self, stats: &Stats) -> Result<(), TrendswapError>;
}
