//! Fan-out delivery: routes a matched envelope to wherever a subscription
//! asked for it, via in-process pub/sub or a signed webhook.

pub mod pubsub;
pub mod signature;
pub mod webhook;

use registry::Delivery;
use semantic::retry::RetryConfig;
use thiserror::Error;

pub use crate::pubsub::PubSubHub;
pub use crate::webhook::{WebhookError, WebhookSender};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

pub struct Dispatcher {
    pubsub: PubSubHub,
    webhook: WebhookSender,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            pubsub: PubSubHub::new(),
            webhook: WebhookSender::new(),
        }
    }

    pub fn with_webhook_retry_config(mut self, retry: RetryConfig) -> Self {
        self.webhook = WebhookSender::new().with_retry_config(retry);
        self
    }

    pub fn pubsub(&self) -> &PubSubHub {
        &self.pubsub
    }

    /// Deliver `envelope` per `delivery`, tagging it as `event_type` for
    /// webhook consumers that dispatch on it.
    pub async fn deliver(&self, delivery: &Delivery, event_type: &str, envelope: Vec<u8>) -> Result<(), DispatchError> {
        match delivery {
            Delivery::PubSub { channel } => {
                let reached = self.pubsub.publish(channel, envelope);
                if reached == 0 {
                    tracing::debug!(channel, "publish reached no subscribers");
                }
                Ok(())
            }
            Delivery::Webhook { url, secret } => {
                let secret = if secret.is_empty() { None } else { Some(secret.as_str()) };
                self.webhook
                    .send(url, secret, event_type, envelope)
                    .await
                    .map_err(DispatchError::from)
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pubsub_delivery_reaches_subscriber() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.pubsub().subscribe("c1");
        dispatcher
            .deliver(&Delivery::PubSub { channel: "c1".into() }, "data_update", b"hi".to_vec())
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap(), b"hi".to_vec());
    }
}
