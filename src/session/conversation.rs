use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{SESSION_TITLE_ELLIPSIS, SESSION_TITLE_MAX_CHARS};
use crate::models::{ChatMessage, MessageRole};
use crate::utils::VedaError;

pub type SessionId = u64;

/// An archived conversation in the chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    pub created_at: DateTime<Local>,
    pub messages: Vec<ChatMessage>,
}

impl Session {
    /// Get a summary for display
    pub fn summary(&self) -> String {
        format!(
            "{} | {} messages | {}",
            self.created_at.format("%-I:%M %p"),
            self.messages.len(),
            self.title
        )
    }
}

/// Derive a session title from the first user message
///
/// Keeps the first 30 characters and appends an ellipsis when anything was
/// cut. Counts characters, not bytes, so multi-byte text never splits.
pub fn derive_title(first_user_message: &str) -> String {
    let mut chars = first_user_message.chars();
    let head: String = chars.by_ref().take(SESSION_TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}{}", head, SESSION_TITLE_ELLIPSIS)
    } else {
        head
    }
}

/// The active message sequence plus the catalog of past sessions
///
/// Pure in-memory state: nothing here survives a restart, and nothing here
/// talks to the remote API.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    sessions: Vec<Session>,
    current_session: Option<SessionId>,
    next_id: SessionId,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the active sequence
    pub fn append_message(&mut self, role: MessageRole, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::new(role, content));
        &self.messages[self.messages.len() - 1]
    }

    /// Drop the active sequence so the next message starts a fresh conversation
    pub fn start_new_session(&mut self) {
        debug!(discarded = self.messages.len(), "starting new session");
        self.messages.clear();
        self.current_session = None;
    }

    /// Replace the active sequence with a copy of an archived session
    pub fn load_session(&mut self, id: SessionId) -> Result<&[ChatMessage], VedaError> {
        let session = self
            .sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or(VedaError::SessionNotFound(id))?;

        self.messages = session.messages.clone();
        self.current_session = Some(id);
        debug!(id, messages = self.messages.len(), "loaded session");
        Ok(&self.messages)
    }

    /// Record the first exchange of a fresh conversation in the catalog
    ///
    /// The new session is placed first and becomes the current session.
    pub fn archive_session(
        &mut self,
        first_user: &ChatMessage,
        first_assistant: &ChatMessage,
    ) -> &Session {
        self.next_id += 1;
        let session = Session {
            id: self.next_id,
            title: derive_title(&first_user.content),
            created_at: Local::now(),
            messages: vec![first_user.clone(), first_assistant.clone()],
        };
        debug!(id = session.id, title = %session.title, "archived session");

        self.current_session = Some(session.id);
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Forget every archived session and the active sequence
    pub fn clear_history(&mut self) {
        self.sessions.clear();
        self.start_new_session();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Archived sessions, newest first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.current_session
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contents(store: &ConversationStore) -> Vec<(MessageRole, &str)> {
        store
            .messages()
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect()
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut store = ConversationStore::new();
        store.append_message(MessageRole::User, "m1");
        store.append_message(MessageRole::Assistant, "m2");
        store.append_message(MessageRole::User, "m3");

        assert_eq!(
            contents(&store),
            vec![
                (MessageRole::User, "m1"),
                (MessageRole::Assistant, "m2"),
                (MessageRole::User, "m3"),
            ]
        );
    }

    #[test]
    fn test_title_truncates_after_thirty_chars() {
        let title = derive_title("Explain quantum computing in simple terms for beginners");
        assert_eq!(title, "Explain quantum computing in s...");
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn test_title_keeps_short_and_exact_length_input() {
        assert_eq!(derive_title("Hello"), "Hello");

        let exact = "a".repeat(30);
        assert_eq!(derive_title(&exact), exact);
        assert_eq!(derive_title(&"a".repeat(31)), format!("{}...", exact));
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let input = "é".repeat(40);
        assert_eq!(derive_title(&input), format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn test_archive_prepends_and_becomes_current() {
        let mut store = ConversationStore::new();
        let first = store.archive_session(&ChatMessage::user("first"), &ChatMessage::assistant("a"));
        let first_id = first.id;
        let second = store.archive_session(&ChatMessage::user("second"), &ChatMessage::assistant("b"));
        let second_id = second.id;

        assert_ne!(first_id, second_id);
        let titles: Vec<&str> = store.sessions().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(store.current_session_id(), Some(second_id));
    }

    #[test]
    fn test_load_reproduces_archived_sequence() {
        let mut store = ConversationStore::new();
        let user = store.append_message(MessageRole::User, "Hello").clone();
        let reply = store.append_message(MessageRole::Assistant, "Hi there!").clone();
        let id = store.archive_session(&user, &reply).id;
        let archived = store.session(id).unwrap().messages.clone();

        store.start_new_session();
        store.append_message(MessageRole::User, "something else");

        let loaded = store.load_session(id).unwrap().to_vec();
        assert_eq!(loaded, archived);
        assert_eq!(store.messages(), archived.as_slice());
        assert_eq!(store.current_session_id(), Some(id));
    }

    #[test]
    fn test_archived_copy_is_not_a_live_reference() {
        let mut store = ConversationStore::new();
        let user = store.append_message(MessageRole::User, "Hello").clone();
        let reply = store.append_message(MessageRole::Assistant, "Hi").clone();
        let id = store.archive_session(&user, &reply).id;

        store.append_message(MessageRole::User, "follow up");

        assert_eq!(store.session(id).unwrap().messages.len(), 2);
        assert_eq!(store.messages().len(), 3);
    }

    #[test]
    fn test_load_unknown_session_fails() {
        let mut store = ConversationStore::new();
        store.append_message(MessageRole::User, "keep me");

        let err = store.load_session(42).unwrap_err();
        assert!(matches!(err, VedaError::SessionNotFound(42)));
        assert_eq!(store.messages().len(), 1);
    }

    #[test]
    fn test_new_session_and_clear_history() {
        let mut store = ConversationStore::new();
        let user = store.append_message(MessageRole::User, "Hello").clone();
        let reply = store.append_message(MessageRole::Assistant, "Hi").clone();
        store.archive_session(&user, &reply);

        store.start_new_session();
        assert!(store.is_empty());
        assert_eq!(store.current_session_id(), None);
        assert_eq!(store.sessions().len(), 1);

        store.append_message(MessageRole::User, "again");
        store.clear_history();
        assert!(store.is_empty());
        assert!(store.sessions().is_empty());
    }
}
