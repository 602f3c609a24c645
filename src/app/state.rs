use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::gateway::ChatGateway;
use crate::models::{ChatMessage, MessageRole};
use crate::session::{ConversationStore, Session, SessionId};
use crate::utils::{GatewayError, VedaError};

/// What happened to a submitted line
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input; nothing changed
    Ignored,
    /// The assistant replied; `archived` is set when this was the first
    /// exchange of a fresh conversation
    Replied {
        reply: String,
        archived: Option<SessionId>,
    },
    /// The round trip failed; the error text was appended as the reply
    Failed(GatewayError),
}

/// Application context owning the conversation store and the chat gateway
pub struct ChatApp {
    store: ConversationStore,
    gateway: ChatGateway,
}

impl ChatApp {
    pub fn new(gateway: ChatGateway) -> Self {
        Self {
            store: ConversationStore::new(),
            gateway,
        }
    }

    /// Run one round trip for `input`
    ///
    /// The user message stays in the conversation even when the request
    /// fails; the failure shows up as an assistant message instead. The
    /// exclusive borrow keeps a second submit out until this one resolves.
    pub async fn submit(&mut self, input: &str, cancel: &CancellationToken) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let fresh = self.store.is_empty();
        let user = self.store.append_message(MessageRole::User, text).clone();

        let result = self.gateway.send(text, cancel).await;

        match result {
            Ok(reply) => {
                let assistant = self
                    .store
                    .append_message(MessageRole::Assistant, reply.clone())
                    .clone();
                let archived = fresh.then(|| self.store.archive_session(&user, &assistant).id);
                SubmitOutcome::Replied { reply, archived }
            }
            Err(error) => {
                debug!(kind = error.kind(), "round trip failed");
                self.store
                    .append_message(MessageRole::Assistant, error.user_message());
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Start over: empty conversation and a fresh gateway session
    pub async fn new_chat(&mut self) {
        self.store.start_new_session();
        self.gateway.reset().await;
    }

    /// Switch to an archived session
    ///
    /// The gateway is reseeded with the loaded messages so the next request
    /// carries this session's history rather than whatever was active before.
    pub async fn load_session(&mut self, id: SessionId) -> Result<&[ChatMessage], VedaError> {
        let messages = self.store.load_session(id)?.to_vec();
        self.gateway.restore(&messages).await;
        info!(id, "switched to archived session");
        Ok(self.store.messages())
    }

    /// Forget all archived sessions and start over
    pub async fn clear_history(&mut self) {
        self.store.clear_history();
        self.gateway.reset().await;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    pub fn sessions(&self) -> &[Session] {
        self.store.sessions()
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.store.current_session_id()
    }

    pub fn gateway(&self) -> &ChatGateway {
        &self.gateway
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }
}
