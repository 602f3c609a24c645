pub mod app;
pub mod attachments;
pub mod cli;
pub mod constants;
pub mod gateway;
pub mod models;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, ChatApp, Config};
pub use gateway::ChatGateway;
pub use models::{BackendFactory, ChatBackend, ChatMessage, MessageRole};
pub use session::ConversationStore;
pub use utils::{GatewayError, VedaError};
