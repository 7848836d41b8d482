//! Lifecycle notifications.
//!
//! Observers are invoked synchronously after a mutation has been committed to
//! the store. Nothing in the ledger depends on a notification being delivered.

use drip_core::{AccountId, Amount, StreamId, Timestamp};
use serde::{Deserialize, Serialize};

/// Emitted once per successful `create_stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCreated {
    pub id: StreamId,
    pub start_time: Timestamp,
    pub deposit: Amount,
    pub duration: u64,
    pub rate_per_second: Amount,
    pub is_running: bool,
}

/// Every committed ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Created(StreamCreated),
    Paused {
        id: StreamId,
        at: Timestamp,
        duration_elapsed: u64,
    },
    Resumed {
        id: StreamId,
        at: Timestamp,
        stop_time: Timestamp,
    },
    Withdrawn {
        id: StreamId,
        amount: Amount,
        to: AccountId,
        total_withdrawn: Amount,
    },
}

impl LedgerEvent {
    pub fn stream_id(&self) -> StreamId {
        match self {
            LedgerEvent::Created(created) => created.id,
            LedgerEvent::Paused { id, .. }
            | LedgerEvent::Resumed { id, .. }
            | LedgerEvent::Withdrawn { id, .. } => *id,
        }
    }
}

/// Receives ledger events.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &LedgerEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &LedgerEvent) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::Created(c) => tracing::info!(
                stream = %c.id,
                start_time = c.start_time,
                deposit = %c.deposit,
                duration = c.duration,
                rate_per_second = %c.rate_per_second,
                is_running = c.is_running,
                "stream created"
            ),
            LedgerEvent::Paused {
                id,
                at,
                duration_elapsed,
            } => tracing::info!(stream = %id, at, duration_elapsed, "stream paused"),
            LedgerEvent::Resumed { id, at, stop_time } => {
                tracing::info!(stream = %id, at, stop_time, "stream resumed")
            }
            LedgerEvent::Withdrawn {
                id,
                amount,
                to,
                total_withdrawn,
            } => tracing::info!(
                stream = %id,
                amount = %amount,
                to = %to,
                total_withdrawn = %total_withdrawn,
                "withdrawal settled"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_stream_id() {
        let created = LedgerEvent::Created(StreamCreated {
            id: StreamId::new(4),
            start_time: 10,
            deposit: 36,
            duration: 3600,
            rate_per_second: 0,
            is_running: true,
        });
        assert_eq!(created.stream_id(), StreamId::new(4));

        let paused = LedgerEvent::Paused {
            id: StreamId::new(9),
            at: 50,
            duration_elapsed: 40,
        };
        assert_eq!(paused.stream_id(), StreamId::new(9));
    }

    #[test]
    fn test_tracing_observer_does_not_panic_without_subscriber() {
        TracingObserver.on_event(&LedgerEvent::Resumed {
            id: StreamId::new(1),
            at: 100,
            stop_time: 200,
        });
    }
}
