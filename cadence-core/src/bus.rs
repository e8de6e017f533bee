//! Message passing between the scheduler and whoever persists its output.
//!
//! Delivery is synchronous: `publish` returns only after every handler
//! registered for the message has run, and handler errors propagate to the
//! publisher unchanged.

use crate::error::CadenceResult;
use crate::model::{Event, EventSerie};

/// A freshly derived series together with its anchor event. Consumers must
/// persist both documents as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriePrepared {
    pub serie: EventSerie,
    pub event: Event,
}

/// Every message the scheduler publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    SeriePrepared(SeriePrepared),
}

/// Receives messages of one shape.
pub trait Handler<M> {
    fn handle(&mut self, message: M) -> CadenceResult<()>;
}

/// Routes messages to their handlers. `target` is the collaborator the
/// publisher owns (typically its storage), lent for the duration of delivery.
pub trait MessageBus<T> {
    fn publish(&mut self, message: Message, target: &mut T) -> CadenceResult<()>;
}

/// Bus that delivers series messages to the storage's own handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageBus;

impl<T: Handler<SeriePrepared>> MessageBus<T> for StorageBus {
    fn publish(&mut self, message: Message, target: &mut T) -> CadenceResult<()> {
        match message {
            Message::SeriePrepared(prepared) => target.handle(prepared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        handled: usize,
    }

    impl Handler<SeriePrepared> for Counter {
        fn handle(&mut self, _message: SeriePrepared) -> CadenceResult<()> {
            self.handled += 1;
            Ok(())
        }
    }

    fn prepared() -> SeriePrepared {
        use crate::author::{Author, CatalogValidator};
        use crate::rule::RepeatableEvent;
        use chrono::{TimeZone, Utc};

        let author = Author::new("alice", "en-US", "UTC", &CatalogValidator::new(["en-US"])).unwrap();
        let from = Utc.with_ymd_and_hms(2014, 1, 6, 9, 0, 0).unwrap();
        let rule = RepeatableEvent::weekly(author, "Standup", from, from);
        let serie = EventSerie::from_rule(&rule);
        let event = Event::anchor_for(&rule, &serie.id);
        SeriePrepared { serie, event }
    }

    #[test]
    fn test_storage_bus_routes_to_handler() {
        let mut counter = Counter::default();
        StorageBus
            .publish(Message::SeriePrepared(prepared()), &mut counter)
            .unwrap();
        assert_eq!(counter.handled, 1);
    }
}
