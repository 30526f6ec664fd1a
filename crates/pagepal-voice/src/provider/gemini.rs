//! Gemini TTS provider (`generateContent` with an AUDIO response modality).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio, build_client, error_from_response};
use crate::decode::AudioFormat;
use crate::error::VoiceError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_GEMINI_VOICE: &str = "Kore";

/// Connection and voice settings for [`GeminiTts`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_TTS_MODEL.to_string(),
            voice: DEFAULT_GEMINI_VOICE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ── Response shape ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: Option<String>,
}

/// Text-to-speech through Gemini's audio output modality.
pub struct GeminiTts {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiTts {
    pub fn new(config: GeminiConfig) -> Result<Self, VoiceError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn body(&self, request: &SynthesisRequest) -> Value {
        let voice = request.voice.as_deref().unwrap_or(&self.config.voice);
        json!({
            "contents": [{ "parts": [{ "text": request.text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            }
        })
    }
}

/// Pull the base64 PCM out of a `generateContent` response.
fn extract_audio(response: GenerateResponse) -> Result<Vec<u8>, VoiceError> {
    let encoded = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.inline_data)
        .and_then(|d| d.data)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| VoiceError::Generation("No audio data received from Gemini".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| VoiceError::Decode(format!("invalid base64 audio from Gemini: {e}")))
}

#[async_trait]
impl SpeechSynthesizer for GeminiTts {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, VoiceError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&self.body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            tracing::error!(error = %err, "Gemini TTS request failed");
            return Err(err);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Generation(format!("malformed Gemini response: {e}")))?;
        let bytes = extract_audio(parsed)?;
        tracing::debug!(bytes = bytes.len(), "Gemini TTS audio received");

        Ok(SynthesizedAudio {
            bytes,
            format: AudioFormat::PROVIDER_PCM,
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiTts {
        GeminiTts::new(GeminiConfig::new("gm-key")).unwrap()
    }

    fn parse(value: Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn endpoint_includes_model() {
        assert_eq!(
            provider().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
        );
    }

    #[test]
    fn body_requests_audio_with_voice() {
        let request = SynthesisRequest {
            text: "Hi there".to_string(),
            voice: None,
        };
        let body = provider().body(&request);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi there");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn extracts_inline_audio() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "mimeType": "audio/L16", "data": "AAABAA==" } }] }
            }]
        }));
        assert_eq!(extract_audio(response).unwrap(), vec![0, 0, 1, 0]);
    }

    #[test]
    fn missing_audio_is_a_generation_error() {
        let response = parse(json!({ "candidates": [{ "content": { "parts": [{ "text": "sorry" }] } }] }));
        let err = extract_audio(response).unwrap_err();
        assert!(
            matches!(&err, VoiceError::Generation(m) if m == "No audio data received from Gemini"),
            "unexpected error: {err:?}"
        );

        let err = extract_audio(parse(json!({}))).unwrap_err();
        assert!(matches!(err, VoiceError::Generation(_)));
    }

    #[test]
    fn bad_base64_is_a_decode_error() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "!!!" } }] } }]
        }));
        assert!(matches!(extract_audio(response), Err(VoiceError::Decode(_))));
    }
}
