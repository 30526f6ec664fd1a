//! CLI bootstrap - the composition root.
//!
//! This is the only place where the speech provider, the audio output and
//! the playback controller are wired together.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pagepal_core::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, Settings, TtsProvider, validate_settings,
    with_retry,
};
use pagepal_voice::{
    ControllerConfig, GeminiConfig, GeminiTts, OpenAiConfig, OpenAiSpeech, PlaybackController,
    PlaybackEvent, RodioOutput, SpeechSynthesizer, SynthesisRequest, SynthesizedAudio,
    SystemClock, VoiceError,
};
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::parser::Cli;

/// Apply command-line overrides on top of environment settings.
pub fn resolve_settings(cli: &Cli, mut settings: Settings) -> Result<Settings, CliError> {
    if let Some(provider) = cli.provider {
        settings.tts_provider = provider;
    }
    if let Some(voice) = &cli.voice {
        settings.tts_voice = Some(voice.clone());
    }
    validate_settings(&settings)?;
    Ok(settings)
}

/// Retries transient provider failures before handing them to the
/// controller.
pub struct RetryingSynthesizer {
    inner: Arc<dyn SpeechSynthesizer>,
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryingSynthesizer {
    pub fn new(inner: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            inner,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for RetryingSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, VoiceError> {
        with_retry(
            || self.inner.synthesize(request),
            self.max_attempts,
            self.base_delay,
        )
        .await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Build the configured provider, wrapped in the retry policy.
pub fn build_synthesizer(settings: &Settings) -> Result<Arc<dyn SpeechSynthesizer>, CliError> {
    let key = settings.active_api_key().ok_or_else(|| {
        CliError::Config(format!(
            "{} is not set",
            settings.tts_provider.api_key_env()
        ))
    })?;
    let timeout = Duration::from_secs(settings.http_timeout_secs);

    let provider: Arc<dyn SpeechSynthesizer> = match settings.tts_provider {
        TtsProvider::OpenAi => {
            let mut config = OpenAiConfig::new(key).with_timeout(timeout);
            if let Some(voice) = &settings.tts_voice {
                config = config.with_voice(voice.clone());
            }
            Arc::new(OpenAiSpeech::new(config)?)
        }
        TtsProvider::Gemini => {
            let mut config = GeminiConfig::new(key).with_timeout(timeout);
            if let Some(voice) = &settings.tts_voice {
                config = config.with_voice(voice.clone());
            }
            Arc::new(GeminiTts::new(config)?)
        }
    };

    tracing::debug!(provider = provider.name(), "Speech provider ready");
    Ok(Arc::new(RetryingSynthesizer::new(provider)))
}

/// Everything `speak` needs.
pub struct CliContext {
    pub controller: PlaybackController,
    pub events: mpsc::UnboundedReceiver<PlaybackEvent>,
    pub seek_step_secs: f64,
}

/// Compose the controller for validated settings.
pub fn bootstrap(settings: &Settings) -> Result<CliContext, CliError> {
    let synthesizer = build_synthesizer(settings)?;
    let config = ControllerConfig {
        cache_size: settings.tts_cache_size,
        evict_batch: settings.tts_cache_evict,
        // Voice is already baked into the provider config.
        voice: None,
    };

    let (controller, events) = PlaybackController::new(
        synthesizer,
        Arc::new(RodioOutput::new()),
        Arc::new(SystemClock::new()),
        config,
    );

    Ok(CliContext {
        controller,
        events,
        seek_step_secs: settings.seek_step_secs,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use clap::Parser;
    use pagepal_voice::AudioFormat;

    use super::*;

    struct FlakySynth {
        calls: AtomicU32,
        failures: u32,
        message: &'static str,
    }

    #[async_trait]
    impl SpeechSynthesizer for FlakySynth {
        async fn synthesize(&self, _request: &SynthesisRequest) -> Result<SynthesizedAudio, VoiceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(VoiceError::Generation(self.message.to_string()));
            }
            Ok(SynthesizedAudio {
                bytes: vec![0; 4],
                format: AudioFormat::PROVIDER_PCM,
            })
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn request() -> SynthesisRequest {
        SynthesisRequest {
            text: "hi".to_string(),
            voice: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failure_once() {
        let inner = Arc::new(FlakySynth {
            calls: AtomicU32::new(0),
            failures: 1,
            message: "overloaded (status 503)",
        });
        let retrying = RetryingSynthesizer::new(inner.clone());
        tokio_test::assert_ok!(retrying.synthesize(&request()).await);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_auth_failure() {
        let inner = Arc::new(FlakySynth {
            calls: AtomicU32::new(0),
            failures: 5,
            message: "Incorrect API key (status 401)",
        });
        let retrying = RetryingSynthesizer::new(inner.clone());
        tokio_test::assert_err!(retrying.synthesize(&request()).await);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cli_overrides_settings() {
        let cli = Cli::parse_from(["pagepal", "--provider", "gemini", "--voice", "Puck", "clean", "x"]);
        let mut settings = Settings::with_defaults();
        settings.gemini_api_key = Some("gm-key".to_string());

        let resolved = resolve_settings(&cli, settings).unwrap();
        assert_eq!(resolved.tts_provider, TtsProvider::Gemini);
        assert_eq!(resolved.tts_voice.as_deref(), Some("Puck"));
    }

    #[test]
    fn missing_key_is_config_error() {
        let cli = Cli::parse_from(["pagepal", "clean", "x"]);
        let err = resolve_settings(&cli, Settings::with_defaults()).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }
}
