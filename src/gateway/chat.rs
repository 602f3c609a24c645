use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::handle::ChatSession;
use crate::models::{ChatBackend, ChatMessage};
use crate::utils::GatewayError;

/// Stateful adapter between the conversation store and a remote backend
///
/// Holds at most one [`ChatSession`]. The session sits behind an async mutex
/// that is held for the whole round trip, so overlapping `send` calls run one
/// after another in the order they were issued.
pub struct ChatGateway {
    backend: Box<dyn ChatBackend>,
    handle: Mutex<Option<ChatSession>>,
    timeout: Duration,
    handles_created: AtomicU64,
}

impl ChatGateway {
    pub fn new(backend: Box<dyn ChatBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            handle: Mutex::new(None),
            timeout,
            handles_created: AtomicU64::new(0),
        }
    }

    pub fn model_name(&self) -> String {
        self.backend.name()
    }

    /// Create the session handle if there is none
    ///
    /// Returns `true` when a new handle was created.
    pub async fn ensure_active(&self) -> bool {
        let mut slot = self.handle.lock().await;
        let created = slot.is_none();
        self.activate(&mut slot);
        created
    }

    fn activate<'a>(&self, slot: &'a mut Option<ChatSession>) -> &'a mut ChatSession {
        if slot.is_none() {
            let count = self.handles_created.fetch_add(1, Ordering::Relaxed) + 1;
            info!(model = %self.backend.name(), handles = count, "initializing chat session");
        }
        slot.get_or_insert_with(ChatSession::new)
    }

    /// Send one message and return the reply
    ///
    /// On any failure the session history is left as it was. No retries.
    pub async fn send(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(GatewayError::EmptyMessage);
        }
        self.backend.ensure_configured()?;

        let mut slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
            slot = self.handle.lock() => slot,
        };
        let session = self.activate(&mut slot);

        debug!(chars = message.len(), history = session.history().len(), "sending message");
        let request = self.backend.generate(session.history(), message);
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(reply) => reply,
                Err(_) => Err(GatewayError::Connectivity(format!(
                    "no response within {}s",
                    self.timeout.as_secs_f32()
                ))),
            },
        };

        let reply = match outcome {
            Ok(reply) if reply.trim().is_empty() => {
                Err(GatewayError::Integrity("empty response".to_string()))
            }
            other => other,
        }
        .map_err(|e| {
            warn!(kind = e.kind(), error = %e, "send failed");
            e
        })?;

        session.record_exchange(message, &reply);
        debug!(chars = reply.len(), "response received");
        Ok(reply)
    }

    /// Discard the session handle; the next `send` starts with empty history
    pub async fn reset(&self) {
        let mut slot = self.handle.lock().await;
        if slot.take().is_some() {
            info!("chat session reset");
        }
    }

    /// Replace the session handle with one seeded from `history`
    pub async fn restore(&self, history: &[ChatMessage]) {
        let mut slot = self.handle.lock().await;
        let count = self.handles_created.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(turns = history.len(), handles = count, "restoring chat session");
        *slot = Some(ChatSession::with_history(history.to_vec()));
    }

    pub async fn is_active(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Copy of the history the next request would carry
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.handle
            .lock()
            .await
            .as_ref()
            .map(|s| s.history().to_vec())
            .unwrap_or_default()
    }

    /// Number of session handles created over the gateway's lifetime
    pub fn handles_created(&self) -> u64 {
        self.handles_created.load(Ordering::Relaxed)
    }
}
