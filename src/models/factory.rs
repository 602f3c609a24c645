use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{info, warn};

use super::gemini::GeminiBackend;
use super::traits::ChatBackend;
use crate::app::Config;
use crate::utils::redact;

/// Factory for creating chat backends from configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Create the Gemini backend described by `config`
    ///
    /// The credential is resolved here, once, at startup. A missing key is
    /// reported immediately but is not fatal: every send will then fail with
    /// a configuration error without touching the network.
    pub fn create(config: &Config) -> Result<Box<dyn ChatBackend>> {
        let gemini = &config.gemini;
        let api_key = gemini.resolve_api_key();

        match &api_key {
            Some(key) => info!(model = %gemini.model, key = %redact(key), "API key loaded"),
            None => warn!(
                "API key is not set. Please set {} or gemini.api_key in your config",
                gemini.api_key_env
            ),
        }

        let client = Client::builder()
            .connect_timeout(gemini.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Box::new(GeminiBackend::new(
            client,
            gemini.base_url.clone(),
            gemini.model.clone(),
            api_key,
            gemini.api_key_env.clone(),
            gemini.generation_settings(),
        )))
    }

    /// Whether a credential is available for `config`
    pub fn has_credential(config: &Config) -> bool {
        config.gemini.resolve_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::GatewayError;

    #[test]
    fn test_backend_uses_configured_model() {
        let mut config = Config::default();
        config.gemini.model = "gemini-1.5-pro".to_string();
        config.gemini.api_key = Some("test-key".to_string());

        let backend = BackendFactory::create(&config).unwrap();

        assert_eq!(backend.name(), "gemini-1.5-pro");
        assert!(backend.ensure_configured().is_ok());
        assert!(BackendFactory::has_credential(&config));
    }

    #[test]
    fn test_missing_credential_is_detected_eagerly() {
        let mut config = Config::default();
        config.gemini.api_key_env = "VEDA_FACTORY_TEST_UNSET_KEY".to_string();

        let backend = BackendFactory::create(&config).unwrap();

        assert!(!BackendFactory::has_credential(&config));
        assert!(matches!(
            backend.ensure_configured(),
            Err(GatewayError::Configuration(_))
        ));
    }
}
