/// Constants module to avoid magic numbers in the codebase

// Remote API
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

// Timeouts
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_VOICE_DURATION_MS: u64 = 3000;

// Default Model Configuration
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

// Session titles
pub const SESSION_TITLE_MAX_CHARS: usize = 30;
pub const SESSION_TITLE_ELLIPSIS: &str = "...";

// Input fragments
pub const VOICE_PLACEHOLDER: &str = "Hello, can you help me with something?";
pub const DEFAULT_TRANSLATE_LANGUAGE: &str = "Spanish";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

// Config
pub const CONFIG_ENV_PREFIX: &str = "VEDA_";
pub const LOCAL_CONFIG_PATH: &str = ".veda/config.toml";
