//! Speech synthesis providers: the text to audio boundary.
//!
//! The [`PlaybackController`](crate::controller::PlaybackController) only
//! sees the [`SpeechSynthesizer`] trait, so any service that turns text into
//! an audio payload can be swapped in.
//!
//! | Provider | Module | Payload |
//! |----------|--------|---------|
//! | OpenAI `audio/speech` | [`openai`] | PCM16, 24 kHz mono |
//! | Gemini `generateContent` TTS | [`gemini`] | base64 PCM16, 24 kHz mono |

pub mod gemini;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::decode::AudioFormat;
use crate::error::{VoiceError, provider_message};

pub use gemini::{GeminiConfig, GeminiTts};
pub use openai::{OpenAiConfig, OpenAiSpeech};

/// A synthesis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Text to speak, already cleaned for speech.
    pub text: String,
    /// Voice override; `None` uses the provider's configured voice.
    pub voice: Option<String>,
}

/// Raw audio returned by a provider, not yet decoded.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

/// Backend-agnostic text-to-speech service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `request.text`.
    ///
    /// Failures are reported as [`VoiceError::Generation`] carrying the
    /// provider's message.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, VoiceError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

/// Error envelope shared by the OpenAI and Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Turn a non-success response into a [`VoiceError::Generation`].
///
/// The HTTP status is appended so callers can tell auth failures apart.
async fn error_from_response(response: reqwest::Response) -> VoiceError {
    let status = response.status();
    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message);

    VoiceError::Generation(format!(
        "{} (status {})",
        provider_message(message),
        status.as_u16()
    ))
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, VoiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pagepal/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| VoiceError::Generation(format!("failed to create HTTP client: {e}")))
}
