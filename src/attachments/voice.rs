use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{Fragment, InputSource};
use crate::constants::VOICE_PLACEHOLDER;
use crate::utils::VedaError;

/// Simulated microphone input
///
/// Waits for the configured duration and yields a fixed transcript. There is
/// no audio capture behind it.
pub struct VoiceRecorder {
    duration: Duration,
}

impl VoiceRecorder {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl InputSource for VoiceRecorder {
    fn label(&self) -> &str {
        "voice"
    }

    async fn produce(&self) -> Result<Fragment, VedaError> {
        debug!(duration_ms = self.duration.as_millis() as u64, "recording started");
        tokio::time::sleep(self.duration).await;

        Ok(Fragment {
            text: format!("Voice message: \"{}\"", VOICE_PLACEHOLDER),
            notification: "Recording complete!".to_string(),
        })
    }
}

/// Prefills a translation request
pub struct TranslateTemplate {
    language: String,
}

impl TranslateTemplate {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

#[async_trait]
impl InputSource for TranslateTemplate {
    fn label(&self) -> &str {
        "translate"
    }

    async fn produce(&self) -> Result<Fragment, VedaError> {
        Ok(Fragment {
            text: format!("Translate this text to {}: ", self.language),
            notification: "Translation mode activated".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_voice_yields_placeholder_transcript() {
        let fragment = VoiceRecorder::new(Duration::from_millis(5))
            .produce()
            .await
            .unwrap();
        assert_eq!(
            fragment.text,
            "Voice message: \"Hello, can you help me with something?\""
        );
        assert_eq!(fragment.notification, "Recording complete!");
    }

    #[tokio::test]
    async fn test_translate_template_leaves_room_for_text() {
        let fragment = TranslateTemplate::new("Spanish").produce().await.unwrap();
        assert_eq!(fragment.text, "Translate this text to Spanish: ");
    }
}
