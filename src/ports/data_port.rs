//! Bar source port.

use chrono::NaiveDate;

use crate::domain::bar::Bar;
use crate::domain::error::TrendswapError;

pub trait DataPort {
    /// Bars in ascending epoch order whose UTC date lies in `[start, end]`.
    /// A missing bound leaves that side open.
    fn fetch_bars(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, TrendswapError>;
}
