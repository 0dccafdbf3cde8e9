//! Domain event system — decoupled progress reporting.
//!
//! The pipeline publishes events as turns complete, tools run, and records
//! land in the store. The CLI subscribes to render progress; nothing in the
//! pipeline depends on anyone listening.

use crate::schema::Domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// One reasoning turn finished
    TurnCompleted {
        entity: String,
        domain: Domain,
        iteration: usize,
        action: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The loop stopped and its output was coerced into a record
    ExtractionCompleted {
        entity: String,
        domain: Domain,
        terminal_state: String,
        iterations: usize,
        defaulted: bool,
        timestamp: DateTime<Utc>,
    },

    /// A record was written to the store
    RecordStored {
        entity: String,
        domain: Domain,
        timestamp: DateTime<Utc>,
    },

    /// An entity was removed from the store
    RecordDeleted {
        entity: String,
        timestamp: DateTime<Utc>,
    },

    /// An error occurred
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::RecordStored {
            entity: "INSAT-3D".into(),
            domain: Domain::BasicInfo,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::RecordStored { entity, domain, .. } => {
                assert_eq!(entity, "INSAT-3D");
                assert_eq!(*domain, Domain::BasicInfo);
            }
            _ => panic!("Expected RecordStored event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::ErrorOccurred {
            context: "test".into(),
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
