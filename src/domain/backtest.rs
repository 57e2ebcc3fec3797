//! Backtest run over a finite bar sequence.
//!
//! The engine runs synchronously on the caller while a spawned task drains the
//! event channel into a [`TradeAggregator`]. Dropping the sender after the
//! last row closes the stream and lets the task hand back the ledger.

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use crate::domain::aggregator::{TradeAggregator, TradeRecord};
use crate::domain::bar::Bar;
use crate::domain::engine::{EngineConfig, SignalEngine};
use crate::domain::error::TrendswapError;
use crate::domain::event::Event;
use crate::domain::metrics::Stats;
use crate::domain::pipeline::{IndicatorConfig, IndicatorPipeline};
use crate::domain::series::SeriesStore;

#[derive(Debug)]
pub struct BacktestResult {
    pub store: SeriesStore,
    pub trades: Vec<TradeRecord>,
    pub stats: Stats,
}

pub async fn run_backtest(
    bars: &[Bar],
    indicators: IndicatorConfig,
    engine: EngineConfig,
) -> Result<BacktestResult, TrendswapError> {
    let mut store = SeriesStore::from_bars(bars)?;
    IndicatorPipeline::new(indicators, engine.session).run(&mut store)?;

    let (mut sender, receiver) = mpsc::unbounded_channel();
    let consumer = tokio::spawn(aggregate(receiver));

    let mut engine = SignalEngine::new(engine);
    let produced = engine.run(&store, &mut sender);
    drop(sender);

    let (trades, stats) = consumer.await.map_err(|e| TrendswapError::Aggregator {
        reason: e.to_string(),
    })?;
    produced?;

    info!(
        rows = store.len(),
        trades = trades.len(),
        net_profit = stats.net_profit,
        "backtest complete"
    );
    Ok(BacktestResult {
        store,
        trades,
        stats,
    })
}

async fn aggregate(mut events: UnboundedReceiver<Event>) -> (Vec<TradeRecord>, Stats) {
    let mut aggregator = TradeAggregator::new();
    while let Some(event) = events.recv().await {
        aggregator.on_event(event);
    }
    aggregator.finish();
    aggregator.into_parts()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = 22_000.0 + 60.0 * (i as f64 / 5.0).sin();
                Bar::from_epoch(1_735_790_400 + 60 * i as i64, c, c + 3.0, c - 3.0, c, 1.0)
                    .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn backtest_returns_enriched_store_and_consistent_stats() {
        let result = run_backtest(&bars(120), IndicatorConfig::default(), EngineConfig::default())
            .await
            .unwrap();
        assert_eq!(result.store.len(), 120);
        assert_eq!(result.stats.total_trades, result.trades.len());
        let net: f64 = result.trades.iter().map(|t| t.profit).sum();
        assert!((net - result.stats.net_profit).abs() < 1e-6);
    }

    #[tokio::test]
    async fn empty_input_is_a_precondition_error() {
        let err = run_backtest(&[], IndicatorConfig::default(), EngineConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TrendswapError::EmptySeries { .. }));
    }
}
