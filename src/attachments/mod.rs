// Gateway module for input sources - follows the Train Station Pattern
// All external access must go through this gateway

mod file;
mod voice;

use async_trait::async_trait;

use crate::utils::VedaError;

pub use file::{FileAttachment, ImageAttachment};
pub use voice::{TranslateTemplate, VoiceRecorder};

/// Text to insert into the pending message, plus a short status line
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub notification: String,
}

/// Anything that can produce a fragment for the pending message
#[async_trait]
pub trait InputSource: Send + Sync {
    fn label(&self) -> &str;

    async fn produce(&self) -> Result<Fragment, VedaError>;
}
