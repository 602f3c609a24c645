use async_trait::async_trait;

use super::types::ChatMessage;
use crate::utils::GatewayError;

/// Core trait that every remote chat backend must implement
///
/// Implementations classify their own failures into [`GatewayError`]; callers
/// never look at error text to decide what went wrong.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate a reply to `message`, given the prior turns of the conversation
    async fn generate(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, GatewayError>;

    /// Get the name of the model behind this backend
    fn name(&self) -> String;

    /// Fail fast when the backend cannot possibly succeed (e.g. no credential)
    fn ensure_configured(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}
