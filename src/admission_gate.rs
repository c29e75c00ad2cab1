//! # Admission Gate Module
//!
//! Bounded concurrency for outbound transport calls. Every call waits for a
//! semaphore permit, then runs under a timeout; a call that times out is
//! dropped, which cancels it. Edits are idempotent and get repeated after a
//! short jittered delay when they fail with a retryable error. Sends and
//! callback answers are never repeated.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::transport::{Keyboard, Transport, TransportError};

/// Wraps a transport with an admission gate
pub struct GatedTransport<T> {
    inner: T,
    permits: Arc<Semaphore>,
    config: TransportConfig,
}

impl<T: Transport> GatedTransport<T> {
    pub fn new(inner: T, config: TransportConfig) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
        }
    }

    /// Permits currently free
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.config.call_timeout_secs)
    }

    fn retry_delay(&self) -> Duration {
        let base = self.config.retry_delay_ms;
        let jitter = if base > 0 {
            rand::thread_rng().gen_range(0..=base / 2)
        } else {
            0
        };
        Duration::from_millis(base + jitter)
    }

    /// Run one call behind the gate
    async fn admit<F>(&self, operation: &str, call: F) -> Result<(), TransportError>
    where
        F: Future<Output = Result<(), TransportError>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TransportError::Api(format!("{operation}: admission gate closed")))?;

        match tokio::time::timeout(self.call_timeout(), call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_secs = self.config.call_timeout_secs, "Outbound call timed out");
                Err(TransportError::Timeout(operation.to_string()))
            }
        }
    }

    /// Run an idempotent call, repeating it on retryable failures
    async fn admit_with_retry<F, Fut>(&self, operation: &str, make_call: F) -> Result<(), TransportError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        let mut attempt = 0;
        loop {
            match self.admit(operation, make_call()).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.config.edit_retries => {
                    attempt += 1;
                    let delay = self.retry_delay();
                    debug!(operation, attempt, error = %e, delay_ms = delay.as_millis() as u64, "Retrying outbound call");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for GatedTransport<T> {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.admit("send_message", self.inner.send_message(chat_id, text, keyboard))
            .await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_reference: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.admit(
            "send_photo",
            self.inner.send_photo(chat_id, photo_reference, caption, keyboard),
        )
        .await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.admit_with_retry("edit_message_text", || {
            self.inner.edit_message_text(chat_id, message_id, text, keyboard)
        })
        .await
    }

    async fn edit_message_caption(
        &self,
        chat_id: i64,
        message_id: i32,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.admit_with_retry("edit_message_caption", || {
            self.inner.edit_message_caption(chat_id, message_id, caption, keyboard)
        })
        .await
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), TransportError> {
        self.admit("answer_callback", self.inner.answer_callback(callback_id, text))
            .await
    }
}
