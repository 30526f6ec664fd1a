//! Settings domain types and validation.
//!
//! Settings are read from the process environment (the binary loads a `.env`
//! file first). Every field has a default so a bare environment still yields
//! a usable configuration, apart from the provider API key which
//! [`validate_settings`] insists on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of synthesized utterances kept in the speech cache.
pub const DEFAULT_TTS_CACHE_SIZE: usize = 10;

/// Default number of oldest cache entries dropped once the cache overflows.
pub const DEFAULT_TTS_CACHE_EVICT: usize = 3;

/// Default seek step, in seconds, for the rewind / fast-forward controls.
pub const DEFAULT_SEEK_STEP_SECS: f64 = 15.0;

/// Default timeout for provider HTTP calls.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_TTS_PROVIDER: &str = "PAGEPAL_TTS_PROVIDER";
pub const ENV_TTS_VOICE: &str = "PAGEPAL_TTS_VOICE";
pub const ENV_TTS_CACHE_SIZE: &str = "PAGEPAL_TTS_CACHE_SIZE";
pub const ENV_TTS_CACHE_EVICT: &str = "PAGEPAL_TTS_CACHE_EVICT";
pub const ENV_SEEK_STEP_SECS: &str = "PAGEPAL_SEEK_STEP_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PAGEPAL_HTTP_TIMEOUT_SECS";

/// Which cloud text-to-speech service synthesizes read-aloud audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    #[default]
    OpenAi,
    Gemini,
}

impl TtsProvider {
    /// Environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => ENV_OPENAI_API_KEY,
            Self::Gemini => ENV_GEMINI_API_KEY,
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
            Self::Gemini => f.write_str("gemini"),
        }
    }
}

impl FromStr for TtsProvider {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(SettingsError::UnknownProvider(other.to_string())),
        }
    }
}

/// Application settings.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// OpenAI API key (`sk-…`), used by the OpenAI speech provider.
    pub openai_api_key: Option<String>,

    /// Google AI Studio key, used by the Gemini TTS provider.
    pub gemini_api_key: Option<String>,

    /// Active speech provider.
    pub tts_provider: TtsProvider,

    /// Voice override; `None` keeps the provider's default voice.
    pub tts_voice: Option<String>,

    /// Maximum number of cached utterances.
    pub tts_cache_size: usize,

    /// How many of the oldest utterances are evicted on overflow.
    pub tts_cache_evict: usize,

    /// Seek step for rewind / fast-forward, in seconds.
    pub seek_step_secs: f64,

    /// Provider HTTP timeout, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// API keys never reach logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("tts_provider", &self.tts_provider)
            .field("tts_voice", &self.tts_voice)
            .field("tts_cache_size", &self.tts_cache_size)
            .field("tts_cache_evict", &self.tts_cache_evict)
            .field("seek_step_secs", &self.seek_step_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Settings with every tunable at its default and no API keys.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            openai_api_key: None,
            gemini_api_key: None,
            tts_provider: TtsProvider::OpenAi,
            tts_voice: None,
            tts_cache_size: DEFAULT_TTS_CACHE_SIZE,
            tts_cache_evict: DEFAULT_TTS_CACHE_EVICT,
            seek_step_secs: DEFAULT_SEEK_STEP_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::with_defaults();

        settings.openai_api_key = get(ENV_OPENAI_API_KEY).map(|v| v.trim().to_string());
        settings.gemini_api_key = get(ENV_GEMINI_API_KEY).map(|v| v.trim().to_string());
        settings.tts_voice = get(ENV_TTS_VOICE).map(|v| v.trim().to_string());

        if let Some(provider) = get(ENV_TTS_PROVIDER) {
            settings.tts_provider = provider.parse()?;
        }
        if let Some(raw) = get(ENV_TTS_CACHE_SIZE) {
            settings.tts_cache_size = parse_value(ENV_TTS_CACHE_SIZE, &raw)?;
        }
        if let Some(raw) = get(ENV_TTS_CACHE_EVICT) {
            settings.tts_cache_evict = parse_value(ENV_TTS_CACHE_EVICT, &raw)?;
        }
        if let Some(raw) = get(ENV_SEEK_STEP_SECS) {
            settings.seek_step_secs = parse_value(ENV_SEEK_STEP_SECS, &raw)?;
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_SECS) {
            settings.http_timeout_secs = parse_value(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }

        Ok(settings)
    }

    /// API key for the active provider, if configured.
    #[must_use]
    pub fn active_api_key(&self) -> Option<&str> {
        match self.tts_provider {
            TtsProvider::OpenAi => self.openai_api_key.as_deref(),
            TtsProvider::Gemini => self.gemini_api_key.as_deref(),
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, SettingsError> {
    raw.trim().parse().map_err(|_| SettingsError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{env} not found. Add it to your environment or .env file")]
    MissingApiKey { env: &'static str },

    #[error("Invalid OpenAI API key format. API keys should start with \"sk-\"")]
    MalformedOpenAiKey,

    #[error("Unknown TTS provider '{0}' (expected 'openai' or 'gemini')")]
    UnknownProvider(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("TTS cache size must be at least 1")]
    ZeroCacheSize,

    #[error("TTS cache eviction batch must be between 1 and the cache size ({size}), got {evict}")]
    InvalidEvictBatch { evict: usize, size: usize },

    #[error("Seek step must be a positive number of seconds, got {0}")]
    InvalidSeekStep(f64),
}

/// Validate settings before wiring providers and the playback controller.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    match settings.active_api_key() {
        None => {
            return Err(SettingsError::MissingApiKey {
                env: settings.tts_provider.api_key_env(),
            });
        }
        Some(key) if key.trim().is_empty() => {
            return Err(SettingsError::MissingApiKey {
                env: settings.tts_provider.api_key_env(),
            });
        }
        Some(_) => {}
    }

    if let Some(key) = &settings.openai_api_key {
        if !key.starts_with("sk-") {
            return Err(SettingsError::MalformedOpenAiKey);
        }
    }

    if settings.tts_cache_size == 0 {
        return Err(SettingsError::ZeroCacheSize);
    }
    if settings.tts_cache_evict == 0 || settings.tts_cache_evict > settings.tts_cache_size {
        return Err(SettingsError::InvalidEvictBatch {
            evict: settings.tts_cache_evict,
            size: settings.tts_cache_size,
        });
    }

    if !(settings.seek_step_secs.is_finite() && settings.seek_step_secs > 0.0) {
        return Err(SettingsError::InvalidSeekStep(settings.seek_step_secs));
    }

    Ok(())
}
