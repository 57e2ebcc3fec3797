//! Forward mode: one bar at a time.

use tracing::debug;

use crate::domain::bar::Bar;
use crate::domain::engine::{EngineConfig, SignalEngine};
use crate::domain::error::TrendswapError;
use crate::domain::pipeline::{IndicatorConfig, IndicatorPipeline};
use crate::domain::series::SeriesStore;
use crate::ports::event_port::EventSink;

/// Owns the bar history, the engine and the sink for one forward run.
///
/// Each new bar rebuilds the series store from scratch, since the Kalman
/// stage estimates its measurement noise over the whole series, and then
/// steps the engine on the newest row only.
pub struct LiveSession<S: EventSink> {
    bars: Vec<Bar>,
    pipeline: IndicatorPipeline,
    engine: SignalEngine,
    store: SeriesStore,
    sink: S,
}

impl<S: EventSink> LiveSession<S> {
    pub fn new(indicators: IndicatorConfig, engine: EngineConfig, sink: S) -> Self {
        LiveSession {
            bars: Vec::new(),
            pipeline: IndicatorPipeline::new(indicators, engine.session),
            engine: SignalEngine::new(engine),
            store: SeriesStore::new(),
            sink,
        }
    }

    pub fn on_bar(&mut self, bar: Bar) -> Result<(), TrendswapError> {
        if let Some(last) = self.bars.last() {
            if bar.epoch <= last.epoch {
                return Err(TrendswapError::UnorderedBars {
                    row: self.bars.len(),
                });
            }
        }
        self.bars.push(bar);

        let mut store = SeriesStore::from_bars(&self.bars)?;
        self.pipeline.run(&mut store)?;
        self.store = store;

        let row = self.store.len() - 1;
        debug!(row, "live step");
        self.engine.step(&self.store, row, &mut self.sink)
    }

    /// Snapshot of the latest enriched store.
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Close the sink and hand it back.
    pub fn finish(mut self) -> Result<S, TrendswapError> {
        self.sink.close()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregator::TradeAggregator;
    use crate::domain::series::ColumnId;

    fn bar(i: usize) -> Bar {
        let c = 22_000.0 + 50.0 * (i as f64 / 4.0).sin();
        Bar::from_epoch(1_735_790_400 + 60 * i as i64, c, c + 2.0, c - 2.0, c, 1.0).unwrap()
    }

    #[test]
    fn each_bar_rebuilds_the_store() {
        let mut live = LiveSession::new(
            IndicatorConfig::default(),
            EngineConfig::default(),
            Vec::new(),
        );
        for i in 0..5 {
            live.on_bar(bar(i)).unwrap();
            assert_eq!(live.store().len(), i + 1);
            assert_eq!(live.store().column(ColumnId::SlowTrend).unwrap().len(), i + 1);
        }
    }

    #[test]
    fn out_of_order_bar_rejected() {
        let mut live = LiveSession::new(
            IndicatorConfig::default(),
            EngineConfig::default(),
            Vec::new(),
        );
        live.on_bar(bar(3)).unwrap();
        let err = live.on_bar(bar(2)).unwrap_err();
        assert!(matches!(err, TrendswapError::UnorderedBars { row: 1 }));
        assert_eq!(live.store().len(), 1);
    }

    #[test]
    fn finish_returns_closed_aggregator() {
        let mut live = LiveSession::new(
            IndicatorConfig::default(),
            EngineConfig::default(),
            TradeAggregator::new(),
        );
        for i in 0..40 {
            live.on_bar(bar(i)).unwrap();
        }
        let aggregator = live.finish().unwrap();
        assert_eq!(aggregator.stats().total_trades, aggregator.trades().len());
    }
}
