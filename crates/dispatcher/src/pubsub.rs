//! In-process pub/sub fan-out, one `tokio::sync::broadcast` channel per
//! named channel. A publish with no live subscribers is a no-op, not an
//! error — matches how a webhook with a dead endpoint is handled: delivery
//! is best-effort, not at-least-once.

use dashmap::DashMap;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

pub struct PubSubHub {
    channels: DashMap<String, broadcast::Sender<Vec<u8>>>,
}

impl PubSubHub {
    pub fn new() -> Self {
        PubSubHub {
            channels: DashMap::new(),
        }
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<Vec<u8>> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish `envelope` to `channel`. Returns the number of subscribers it
    /// reached (0 if the channel currently has none).
    pub fn publish(&self, channel: &str, envelope: Vec<u8>) -> usize {
        match self.sender(channel).send(envelope) {
            Ok(receiver_count) => receiver_count,
            Err(_) => 0,
        }
    }

    /// Subscribe to `channel`, creating it if it doesn't exist yet.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Vec<u8>> {
        self.sender(channel).subscribe()
    }
}

impl Default for PubSubHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_envelope() {
        let hub = PubSubHub::new();
        let mut rx = hub.subscribe("c1");
        let delivered = hub.publish("c1", b"hello".to_vec());
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap(), b"hello".to_vec());
    }

    #[test]
    fn publish_with_no_subscribers_is_not_an_error() {
        let hub = PubSubHub::new();
        assert_eq!(hub.publish("empty", b"x".to_vec()), 0);
    }

    #[tokio::test]
    async fn channels_are_independent() {
        let hub = PubSubHub::new();
        let mut rx_a = hub.subscribe("a");
        let mut rx_b = hub.subscribe("b");
        hub.publish("a", b"for-a".to_vec());
        assert_eq!(rx_a.recv().await.unwrap(), b"for-a".to_vec());
        assert!(rx_b.try_recv().is_err());
    }
}
