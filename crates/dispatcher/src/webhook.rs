//! Signed webhook delivery with retry and a per-destination circuit breaker.
//!
//! Retries on timeouts and 5xx responses with exponential backoff and
//! jitter; a 4xx response is a client error and is never retried. Delivery
//! failures accumulate against a circuit breaker keyed by the destination
//! URL, so a webhook endpoint that's down stops receiving request attempts
//! until it's had time to recover.

use std::time::Duration;

use once_cell::sync::Lazy;
use semantic::circuit_breaker::{CircuitBreakerConfig, CircuitBreakerManager};
use semantic::retry::RetryConfig;
use thiserror::Error;

use crate::signature;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(32)
        .build()
        .expect("failed to build webhook HTTP client")
});

const USER_AGENT: &str = "Contex-Webhook/0.2.0";
const EVENT_HEADER: &str = "X-Contex-Event";
const SIGNATURE_HEADER: &str = "X-Contex-Signature";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("circuit open for {0}")]
    CircuitOpen(String),
    #[error("webhook endpoint rejected the request: {status}")]
    ClientError { status: u16 },
    #[error("webhook delivery failed after retries: {0}")]
    Exhausted(String),
}

pub struct WebhookSender {
    breakers: CircuitBreakerManager,
    retry: RetryConfig,
}

impl WebhookSender {
    pub fn new() -> Self {
        WebhookSender {
            breakers: CircuitBreakerManager::new(CircuitBreakerConfig::default()),
            // §4.10: "up to N attempts (default 3)" counts the first send,
            // so two retries after it, not `RetryConfig::default()`'s three
            // (tuned for embedding calls, not webhook delivery).
            retry: RetryConfig::default().with_max_retries(2),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_healthy(&self, url: &str) -> bool {
        self.breakers.is_healthy(url)
    }

    /// POST `body` to `url`, signing it with `secret` when present.
    pub async fn send(
        &self,
        url: &str,
        secret: Option<&str>,
        event_type: &str,
        body: Vec<u8>,
    ) -> Result<(), WebhookError> {
        let breaker = self.breakers.get_or_create(url);
        if !breaker.allow_request() {
            return Err(WebhookError::CircuitOpen(url.to_string()));
        }

        let signature = secret.map(|s| signature::sign(&body, s));
        let mut last_error = String::new();

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.calculate_delay(attempt);
                tracing::warn!(url, attempt, ?delay, "retrying webhook delivery");
                tokio::time::sleep(delay).await;
            }

            let mut request = HTTP_CLIENT
                .post(url)
                .header("Content-Type", "application/json")
                .header("User-Agent", USER_AGENT)
                .header(EVENT_HEADER, event_type)
                .body(body.clone());
            if let Some(sig) = &signature {
                request = request.header(SIGNATURE_HEADER, sig.as_str());
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    breaker.record_success();
                    return Ok(());
                }
                Ok(response) if response.status().is_client_error() => {
                    // A 4xx means the endpoint itself rejected the request;
                    // retrying an identical request won't help.
                    breaker.record_failure();
                    return Err(WebhookError::ClientError {
                        status: response.status().as_u16(),
                    });
                }
                Ok(response) => {
                    last_error = format!("server returned {}", response.status());
                }
                Err(err) => {
                    last_error = err.to_string();
                }
            }
        }

        breaker.record_failure();
        Err(WebhookError::Exhausted(last_error))
    }
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    #[tokio::test]
    async fn repeated_connection_failures_open_the_circuit() {
        let sender = WebhookSender::new().with_retry_config(
            RetryConfig::default()
                .with_max_retries(0)
                .with_base_delay(Duration::from_millis(1)),
        );
        // Port 1 is reserved and refuses connections immediately.
        let url = "http://127.0.0.1:1/webhook";
        for _ in 0..5 {
            let _ = sender.send(url, None, "data_update", b"{}".to_vec()).await;
        }
        assert!(!sender.is_healthy(url));
    }

    #[tokio::test]
    async fn retries_on_5xx_then_succeeds() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        Mock::given(method("POST"))
            .respond_with(move |_: &Request| {
                if counted.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .mount(&server)
            .await;

        let sender = WebhookSender::new()
            .with_retry_config(RetryConfig::default().with_base_delay(Duration::from_millis(1)));
        let result = sender.send(&server.uri(), None, "data_update", b"{}".to_vec()).await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3, "two failures then a success is exactly three POSTs");
    }

    #[tokio::test]
    async fn no_retry_on_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let sender = WebhookSender::new();
        let result = sender.send(&server.uri(), None, "data_update", b"{}".to_vec()).await;

        assert!(matches!(result, Err(WebhookError::ClientError { status: 404 })));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn retry_delays_follow_jittered_exponential_backoff() {
        let server = MockServer::start().await;
        let timestamps = Arc::new(Mutex::new(Vec::<Instant>::new()));
        let recorded = timestamps.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        Mock::given(method("POST"))
            .respond_with(move |_: &Request| {
                recorded.lock().unwrap().push(Instant::now());
                if counted.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .mount(&server)
            .await;

        let sender = WebhookSender::new().with_retry_config(
            RetryConfig::default()
                .with_max_retries(3)
                .with_base_delay(Duration::from_millis(100)),
        );
        let result = sender.send(&server.uri(), None, "data_update", b"{}".to_vec()).await;
        assert!(result.is_ok());

        let hits = timestamps.lock().unwrap();
        assert_eq!(hits.len(), 3);
        let gap_to_second = hits[1].duration_since(hits[0]);
        let gap_to_third = hits[2].duration_since(hits[1]);
        // base_delay=100ms, multiplier=2.0, +/-25% jitter: attempt 1 in
        // [75ms,125ms], attempt 2 in [150ms,250ms]. Widened for scheduler slack.
        assert!(
            gap_to_second >= Duration::from_millis(60) && gap_to_second <= Duration::from_millis(200),
            "gap_to_second={gap_to_second:?}"
        );
        assert!(
            gap_to_third >= Duration::from_millis(130) && gap_to_third <= Duration::from_millis(320),
            "gap_to_third={gap_to_third:?}"
        );
    }
}
