use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_API_KEY_ENV, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
    DEFAULT_TRANSLATE_LANGUAGE, DEFAULT_VOICE_DURATION_MS, LOCAL_CONFIG_PATH,
};
use crate::models::GenerationSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote model configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Shell configuration
    #[serde(default)]
    pub ui: UIConfig,
}

/// Gemini API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model identifier
    pub model: String,
    /// API root, without the `/models/...` suffix
    pub base_url: String,
    /// Environment variable containing the API key
    pub api_key_env: String,
    /// API key (takes precedence over the environment variable)
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
    /// System instruction sent with every request
    pub system_prompt: Option<String>,
    /// Upper bound on a single round trip
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            system_prompt: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Resolve the credential: explicit key first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_output_tokens),
            system_prompt: self.system_prompt.clone(),
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    /// Target language for the translate template
    pub language: String,
    /// Print short notifications after shell actions
    pub notifications: bool,
    /// Length of a simulated voice recording
    pub voice_duration_ms: u64,
    /// Name shown in front of your own messages
    pub user_name: Option<String>,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_TRANSLATE_LANGUAGE.to_string(),
            notifications: true,
            voice_duration_ms: DEFAULT_VOICE_DURATION_MS,
            user_name: None,
        }
    }
}

/// Layer defaults, config files and `VEDA_` environment variables
///
/// Later sources win. Files that don't exist are skipped.
fn build_figment(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // VEDA_GEMINI__MODEL -> gemini.model
    figment.merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
}

/// Load configuration from multiple sources
///
/// An explicit path must exist; the global and local files are optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = vec![
        get_config_dir()?.join("config.toml"),
        PathBuf::from(LOCAL_CONFIG_PATH),
    ];

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        files.push(path.to_path_buf());
    }

    build_figment(&files)
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "veda") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("veda");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path of the file that was created, if any.
pub fn init_config() -> Result<Option<PathBuf>> {
    let config_file = get_config_dir()?.join("config.toml");

    if config_file.exists() {
        return Ok(None);
    }

    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok(Some(config_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_| {
            let config: Config = build_figment(&[]).extract()?;
            assert_eq!(config, Config::default());
            assert_eq!(config.gemini.model, "gemini-2.5-flash");
            assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [gemini]
                model = "gemini-1.5-pro"
                timeout_secs = 15

                [ui]
                language = "French"
                "#,
            )?;
            jail.set_env("VEDA_GEMINI__MODEL", "gemini-2.0-flash");
            jail.set_env("VEDA_UI__USER_NAME", "Ada");

            let config: Config = build_figment(&[PathBuf::from("config.toml")]).extract()?;
            assert_eq!(config.gemini.model, "gemini-2.0-flash");
            assert_eq!(config.gemini.timeout_secs, 15);
            assert_eq!(config.ui.language, "French");
            assert!(config.ui.notifications);
            assert_eq!(config.ui.user_name.as_deref(), Some("Ada"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_key_beats_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("VEDA_TEST_KEY", "from-env");

            let mut gemini = GeminiConfig {
                api_key_env: "VEDA_TEST_KEY".to_string(),
                ..GeminiConfig::default()
            };
            assert_eq!(gemini.resolve_api_key().as_deref(), Some("from-env"));

            gemini.api_key = Some("from-config".to_string());
            assert_eq!(gemini.resolve_api_key().as_deref(), Some("from-config"));

            gemini.api_key = Some("   ".to_string());
            assert_eq!(gemini.resolve_api_key().as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_credential_resolves_to_none() {
        let gemini = GeminiConfig {
            api_key_env: "VEDA_DEFINITELY_UNSET_KEY".to_string(),
            ..GeminiConfig::default()
        };
        assert_eq!(gemini.resolve_api_key(), None);
    }

    #[test]
    fn test_save_writes_loadable_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.gemini.system_prompt = Some("Be brief.".to_string());

        save_config(&config, Some(path.clone())).unwrap();

        Jail::expect_with(|_| {
            let loaded: Config = build_figment(&[path.clone()]).extract()?;
            assert_eq!(loaded, config);
            Ok(())
        });
    }
}
