//! Column-oriented series store shared by the indicator pipeline and the engine.
//!
//! Every column is addressed by a [`ColumnId`] rather than a string name, so the
//! set of columns a transform reads and writes is fixed when the pipeline is
//! built. All columns share the row count of the time column.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::bar::Bar;
use crate::domain::error::TrendswapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    Open,
    High,
    Low,
    Close,
    Volume,
    Cci,
    Atr,
    ScaleWma,
    GeneralAtr,
    DirectionAtr,
    FastEnvelope,
    SlowEnvelope,
    FastEnvelopeEma,
    SlowEnvelopeEma,
    FastEnvelopeSma,
    SlowEnvelopeSma,
    FastTrend,
    SlowTrend,
    FastDirection,
    SlowDirection,
}

impl ColumnId {
    pub const RAW: [ColumnId; 5] = [
        ColumnId::Open,
        ColumnId::High,
        ColumnId::Low,
        ColumnId::Close,
        ColumnId::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColumnId::Open => "open",
            ColumnId::High => "high",
            ColumnId::Low => "low",
            ColumnId::Close => "close",
            ColumnId::Volume => "volume",
            ColumnId::Cci => "cci",
            ColumnId::Atr => "atr",
            ColumnId::ScaleWma => "scale_wma",
            ColumnId::GeneralAtr => "general_atr",
            ColumnId::DirectionAtr => "direction_atr",
            ColumnId::FastEnvelope => "fast_envelope",
            ColumnId::SlowEnvelope => "slow_envelope",
            ColumnId::FastEnvelopeEma => "fast_envelope_ema",
            ColumnId::SlowEnvelopeEma => "slow_envelope_ema",
            ColumnId::FastEnvelopeSma => "fast_envelope_sma",
            ColumnId::SlowEnvelopeSma => "slow_envelope_sma",
            ColumnId::FastTrend => "fast_trend",
            ColumnId::SlowTrend => "slow_trend",
            ColumnId::FastDirection => "fast_direction",
            ColumnId::SlowDirection => "slow_direction",
        }
    }

    pub fn is_raw(self) -> bool {
        Self::RAW.contains(&self)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the store, as handed out to charting collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    pub epoch: i64,
    pub values: Vec<(ColumnId, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    timestamps: Vec<DateTime<Utc>>,
    epochs: Vec<i64>,
    columns: BTreeMap<ColumnId, Vec<f64>>,
}

impl SeriesStore {
    pub fn new() -> Self {
        let mut columns = BTreeMap::new();
        for id in ColumnId::RAW {
            columns.insert(id, Vec::new());
        }
        SeriesStore {
            timestamps: Vec::new(),
            epochs: Vec::new(),
            columns,
        }
    }

    pub fn from_bars(bars: &[Bar]) -> Result<Self, TrendswapError> {
        let mut store = SeriesStore::new();
        for bar in bars {
            store.push_bar(bar)?;
        }
        Ok(store)
    }

    /// Append one raw bar. Derived columns are not extended; they must be
    /// recomputed before they are read again.
    pub fn push_bar(&mut self, bar: &Bar) -> Result<(), TrendswapError> {
        if let Some(&last) = self.epochs.last() {
            if bar.epoch <= last {
                return Err(TrendswapError::UnorderedBars {
                    row: self.epochs.len(),
                });
            }
        }
        self.timestamps.push(bar.timestamp);
        self.epochs.push(bar.epoch);
        for (id, value) in [
            (ColumnId::Open, bar.open),
            (ColumnId::High, bar.high),
            (ColumnId::Low, bar.low),
            (ColumnId::Close, bar.close),
            (ColumnId::Volume, bar.volume),
        ] {
            self.columns.entry(id).or_default().push(value);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn epochs(&self) -> &[i64] {
        &self.epochs
    }

    pub fn contains(&self, column: ColumnId) -> bool {
        self.columns.contains_key(&column)
    }

    pub fn column(&self, column: ColumnId) -> Option<&[f64]> {
        self.columns.get(&column).map(Vec::as_slice)
    }

    /// Fetch a column a transform depends on, failing if it is absent or
    /// misaligned with the time column.
    pub fn require(
        &self,
        transform: &'static str,
        column: ColumnId,
    ) -> Result<&[f64], TrendswapError> {
        let values = self
            .columns
            .get(&column)
            .ok_or(TrendswapError::MissingColumn { transform, column })?;
        if values.len() != self.len() {
            return Err(TrendswapError::LengthMismatch {
                transform,
                column,
                expected: self.len(),
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Append a derived column for the existing rows.
    pub fn insert(&mut self, column: ColumnId, values: Vec<f64>) -> Result<(), TrendswapError> {
        if self.columns.contains_key(&column) {
            return Err(TrendswapError::DuplicateColumn { column });
        }
        if values.len() != self.len() {
            return Err(TrendswapError::LengthMismatch {
                transform: "insert",
                column,
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(column, values);
        Ok(())
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.keys().copied()
    }

    pub fn row(&self, index: usize) -> Option<SeriesRow> {
        let timestamp = *self.timestamps.get(index)?;
        let values = self
            .columns
            .iter()
            .filter_map(|(id, values)| values.get(index).map(|v| (*id, *v)))
            .collect();
        Some(SeriesRow {
            timestamp,
            epoch: self.epochs[index],
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = SeriesRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }
}
