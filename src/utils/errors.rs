use thiserror::Error;

/// Main error type for Veda
#[derive(Error, Debug)]
pub enum VedaError {
    #[error("Session not found: {0}")]
    SessionNotFound(u64),

    #[error("Attachment error: {0}")]
    AttachmentError(String),
}

/// Failures of a single round trip through the chat gateway.
///
/// Classified once where the remote response is read; nothing downstream
/// inspects message text to recover the kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("API key is not configured ({0})")]
    Configuration(String),

    #[error("invalid API key: {0}")]
    Authentication(String),

    #[error("quota exhausted: {0}")]
    RateLimit(String),

    #[error("invalid response: {0}")]
    Integrity(String),

    #[error("network error: {0}")]
    Connectivity(String),

    #[error("model not available: {0}")]
    ModelUnavailable(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("API error: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Text shown to the user in place of an assistant reply
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyMessage => "Please enter a message first.".to_string(),
            Self::Configuration(_) => {
                "API key is not configured. Please check your configuration.".to_string()
            }
            Self::Authentication(_) => {
                "Invalid API key. Please check your configuration.".to_string()
            }
            Self::RateLimit(_) => "API quota exceeded. Please try again later.".to_string(),
            Self::Integrity(detail) => format!("Invalid response from API ({}). Please try again.", detail),
            Self::Connectivity(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            Self::ModelUnavailable(_) => {
                "Model not found. Please check the configured model.".to_string()
            }
            Self::Cancelled => "Request cancelled.".to_string(),
            Self::Unknown(message) => format!("API Error: {}", message),
        }
    }

    /// Short machine-readable label, used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "empty_message",
            Self::Configuration(_) => "configuration",
            Self::Authentication(_) => "authentication",
            Self::RateLimit(_) => "rate_limit",
            Self::Integrity(_) => "integrity",
            Self::Connectivity(_) => "connectivity",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::Cancelled => "cancelled",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_and_auth_messages_differ() {
        let quota = GatewayError::RateLimit("RESOURCE_EXHAUSTED".to_string());
        let auth = GatewayError::Authentication("API_KEY_INVALID".to_string());
        assert_ne!(quota.user_message(), auth.user_message());
        assert_ne!(quota.kind(), auth.kind());
    }

    #[test]
    fn test_unknown_carries_remote_message() {
        let err = GatewayError::Unknown("backend exploded".to_string());
        assert_eq!(err.user_message(), "API Error: backend exploded");
    }
}
