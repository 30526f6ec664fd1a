//! Read-aloud error types.

/// Errors surfaced by speech generation and playback.
///
/// None of these leave the controller in an inconsistent state; after any
/// failure it is back in `Idle` and a new `play` starts from the beginning.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The caller asked to speak blank text.
    #[error("TTS received empty text")]
    EmptyInput,

    /// The speech provider failed or returned an unusable response.
    #[error("Speech generation failed: {0}")]
    Generation(String),

    /// The provider payload could not be turned into playable samples.
    #[error("Failed to decode synthesized audio: {0}")]
    Decode(String),

    /// The audio output device could not be opened or driven.
    #[error("Audio output error: {0}")]
    OutputDevice(String),

    /// The dedicated audio thread is gone.
    #[error("Audio thread is no longer running")]
    AudioThreadDied,
}

impl VoiceError {
    /// Provider failure with an optional upstream message.
    pub(crate) fn generation(message: Option<String>) -> Self {
        Self::Generation(provider_message(message))
    }
}

/// Provider message, or a generic one when the provider gave none.
pub(crate) fn provider_message(message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "TTS generation failed".to_string())
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Generation(format!("network timeout: {err}"))
        } else if err.is_connect() || err.is_request() {
            Self::Generation(format!("network error: {err}"))
        } else {
            Self::Generation(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_falls_back_to_generic_message() {
        assert_eq!(
            VoiceError::generation(None).to_string(),
            "Speech generation failed: TTS generation failed"
        );
        assert_eq!(
            VoiceError::generation(Some("  ".to_string())).to_string(),
            "Speech generation failed: TTS generation failed"
        );
        assert_eq!(
            VoiceError::generation(Some("quota exceeded".to_string())).to_string(),
            "Speech generation failed: quota exceeded"
        );
    }
}
