//! crates/job_tracker_core/src/events.rs
//!
//! A fan-out channel for auth state changes. Auth service implementations
//! publish into it; every subscriber gets its own stream.

use futures::stream;
use tokio::sync::broadcast;
use tracing::warn;

use crate::domain::AuthEvent;
use crate::ports::AuthEventStream;

const DEFAULT_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct AuthEventBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AuthEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes `event` to every live subscriber. Having none is not an error.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.sender.send(event);
    }

    /// A stream of every event published from now on. It ends when the bus is dropped.
    pub fn subscribe(&self) -> AuthEventStream {
        let receiver = self.sender.subscribe();
        Box::pin(stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Auth subscriber lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn every_subscriber_sees_each_event() {
        let bus = AuthEventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(AuthEvent::SignedOut);

        assert_eq!(first.next().await, Some(AuthEvent::SignedOut));
        assert_eq!(second.next().await, Some(AuthEvent::SignedOut));
    }

    #[tokio::test]
    async fn stream_ends_when_bus_is_dropped() {
        let bus = AuthEventBus::default();
        let mut events = bus.subscribe();
        drop(bus);
        assert_eq!(events.next().await, None);
    }
}
