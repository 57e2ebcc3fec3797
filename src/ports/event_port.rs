//! Ordered event sink port.

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::error::TrendswapError;
use crate::domain::event::Event;

/// Accepts engine events in emission order, followed by one stream close.
pub trait EventSink {
    fn accept(&mut self, event: Event) -> Result<(), TrendswapError>;

    fn close(&mut self) -> Result<(), TrendswapError> {
        Ok(())
    }
}

impl EventSink for Vec<Event> {
    fn accept(&mut self, event: Event) -> Result<(), TrendswapError> {
        self.push(event);
        Ok(())
    }
}

/// Producer side of the aggregator channel. The stream closes when the last
/// sender is dropped.
impl EventSink for UnboundedSender<Event> {
    fn accept(&mut self, event: Event) -> Result<(), TrendswapError> {
        self.send(event).map_err(|e| TrendswapError::Aggregator {
            reason: format!("event channel closed before {}", e.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventKind;
    use crate::domain::position::Side;
    use chrono::DateTime;

    fn entry(price: f64) -> Event {
        Event {
            position_id: 1,
            side: Side::Buy,
            kind: EventKind::Entry,
            price,
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            row: 0,
        }
    }

    #[test]
    fn vec_sink_keeps_order() {
        let mut sink: Vec<Event> = Vec::new();
        sink.accept(entry(1.0)).unwrap();
        sink.accept(entry(2.0)).unwrap();
        sink.close().unwrap();
        assert_eq!(sink.iter().map(|e| e.price).collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn channel_sink_fails_once_receiver_is_gone() {
        let (mut tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.accept(entry(1.0)).unwrap();
        drop(rx);
        let err = tx.accept(entry(2.0)).unwrap_err();
        assert!(matches!(err, TrendswapError::Aggregator { .. }));
    }
}
