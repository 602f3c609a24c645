// Gateway module for the chat gateway - follows the Train Station Pattern
// All external access must go through this gateway

mod chat;
mod handle;

pub use chat::ChatGateway;
pub use handle::ChatSession;
