use crate::models::ChatMessage;

/// The live conversation context held by the gateway
///
/// History only grows by whole exchanges: a user turn is recorded together
/// with the reply it produced, never alone.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_history(Vec::new())
    }

    pub fn with_history(history: Vec<ChatMessage>) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub(crate) fn record_exchange(&mut self, user: &str, reply: &str) {
        self.history.push(ChatMessage::user(user));
        self.history.push(ChatMessage::assistant(reply));
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
