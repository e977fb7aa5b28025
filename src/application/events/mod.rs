//! Outbound event publishing.
//!
//! The broker client is an external collaborator; the core only depends on
//! the `MessagePublisher` port. Publishing is fire-and-forget: a delivery
//! failure is logged and never influences the outcome of the operation that
//! raised the event. The in-process implementation fans events out on a
//! tokio broadcast channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::broadcast;

use crate::domain::events::DomainEvent;

/// Default channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// Port for handing domain events to the message broker.
pub trait MessagePublisher: Send + Sync {
    fn publish(&self, event: DomainEvent, exchange: &str, routing_key: &str);
}

/// Shared publisher handle held by the services
pub type SharedPublisher = Arc<dyn MessagePublisher>;

/// A published event together with its routing metadata
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub event: DomainEvent,
    pub exchange: String,
    pub routing_key: String,
    pub published_at: DateTime<Utc>,
}

/// In-process event bus broadcasting published events to all subscribers
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PublishedMessage>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventBus {
    /// Create a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new event bus with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to receive published events
    pub fn subscribe(&self) -> EventSubscriber {
        let receiver = self.sender.subscribe();
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        EventSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    /// Get current subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagePublisher for EventBus {
    fn publish(&self, event: DomainEvent, exchange: &str, routing_key: &str) {
        let event_type = event.event_type();
        let message = PublishedMessage {
            event,
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            published_at: Utc::now(),
        };

        match self.sender.send(message) {
            Ok(count) => {
                debug!(
                    "Event published: type={}, routing_key={}, subscribers={}",
                    event_type, routing_key, count
                );
            }
            Err(_) => {
                // No subscribers - normal when no broker bridge is attached
                debug!(
                    "Event published (no subscribers): type={}, routing_key={}",
                    event_type, routing_key
                );
            }
        }
    }
}

/// Subscriber receiving events from the bus
pub struct EventSubscriber {
    receiver: broadcast::Receiver<PublishedMessage>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventSubscriber {
    /// Receive the next published event
    pub async fn recv(&mut self) -> Option<PublishedMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("Subscriber lagged, {} events missed", count);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return None;
                }
            }
        }
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        let prev = self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
        info!("Event subscriber disconnected, remaining: {}", prev - 1);
    }
}

/// Create a shared event bus
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::new())
}

// ── Tests ──────────────────────────────────────────────────────
