/// Session management module - Gateway

mod conversation;

pub use conversation::{derive_title, ConversationStore, Session, SessionId};
