//! OpenAI `audio/speech` provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio, build_client, error_from_response};
use crate::decode::AudioFormat;
use crate::error::VoiceError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_TTS_MODEL: &str = "gpt-4o-mini-tts";
pub const DEFAULT_OPENAI_VOICE: &str = "alloy";

/// Connection and voice settings for [`OpenAiSpeech`].
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Default endpoint, model and voice for the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_TTS_MODEL.to_string(),
            voice: DEFAULT_OPENAI_VOICE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

/// Text-to-speech through OpenAI's `audio/speech` endpoint.
///
/// Audio is requested as raw PCM so no container decoding is needed.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiSpeech {
    pub fn new(config: OpenAiConfig) -> Result<Self, VoiceError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.config.base_url.trim_end_matches('/'))
    }

    fn body<'a>(&'a self, request: &'a SynthesisRequest) -> SpeechBody<'a> {
        SpeechBody {
            model: &self.config.model,
            input: &request.text,
            voice: request.voice.as_deref().unwrap_or(&self.config.voice),
            response_format: "pcm",
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, VoiceError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            tracing::error!(error = %err, "OpenAI TTS request failed");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        tracing::debug!(bytes = bytes.len(), "OpenAI TTS audio received");

        Ok(SynthesizedAudio {
            bytes: bytes.to_vec(),
            format: AudioFormat::PROVIDER_PCM,
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiSpeech {
        OpenAiSpeech::new(OpenAiConfig::new("sk-test").with_base_url("https://proxy.local/v1/"))
            .unwrap()
    }

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(provider().endpoint(), "https://proxy.local/v1/audio/speech");
    }

    #[test]
    fn body_uses_configured_voice_and_pcm() {
        let provider = provider();
        let request = SynthesisRequest {
            text: "Hello".to_string(),
            voice: None,
        };
        let json = serde_json::to_value(provider.body(&request)).unwrap();
        assert_eq!(json["model"], DEFAULT_OPENAI_TTS_MODEL);
        assert_eq!(json["input"], "Hello");
        assert_eq!(json["voice"], "alloy");
        assert_eq!(json["response_format"], "pcm");
    }

    #[test]
    fn body_honours_voice_override() {
        let provider = provider();
        let request = SynthesisRequest {
            text: "Hello".to_string(),
            voice: Some("nova".to_string()),
        };
        let json = serde_json::to_value(provider.body(&request)).unwrap();
        assert_eq!(json["voice"], "nova");
    }

    #[test]
    fn debug_hides_api_key() {
        let rendered = format!("{:?}", OpenAiConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
