//! Read-aloud playback controller.
//!
//! One controller is shared by every "read aloud" trigger in the host, so at
//! most one utterance is audible at a time. It owns the speech cache and the
//! output device, and tracks elapsed playback time from an injected
//! [`Clock`].
//!
//! ```text
//!   Idle/Paused ──play──► Loading ──ok──► Playing ──pause──► Paused
//!        ▲                   │               │  ▲               │
//!        └──────error────────┘    completion │  └────play(same)─┘
//!        └───────────────────────────────────┘
//! ```
//!
//! Every device start gets a new [`SessionId`]. Completion signals carry the
//! id they were issued for, and anything but the current session's signal
//! is dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::cache::{SpeechCache, Utterance};
use crate::clock::Clock;
use crate::decode::decode;
use crate::error::VoiceError;
use crate::output::{AudioOutput, CompletionNotifier, SessionId};
use crate::provider::{SpeechSynthesizer, SynthesisRequest};
use crate::text::clean_for_speech;

/// Default number of cached utterances.
pub const DEFAULT_CACHE_SIZE: usize = 10;

/// Default number of entries dropped when the cache overflows.
pub const DEFAULT_EVICT_BATCH: usize = 3;

// ── State & events ─────────────────────────────────────────────────

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    /// Waiting on speech generation.
    Loading,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
        };
        f.write_str(label)
    }
}

/// What the UI needs to render a read-aloud button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    /// Seconds into the current utterance.
    pub current_offset: f64,
    /// Length of the current utterance, `0.0` when none is loaded.
    pub duration: f64,
}

/// Notifications emitted to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    StateChanged { state: PlaybackState },
    /// The device started (or restarted after a seek).
    Started { session: SessionId, offset: f64 },
    /// The utterance played to the end.
    Finished { session: SessionId },
    /// `play` failed; the controller is back to `Idle`.
    Error { message: String },
}

/// Construction options for [`PlaybackController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub cache_size: usize,
    pub evict_batch: usize,
    /// Voice override sent with every request.
    pub voice: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            evict_batch: DEFAULT_EVICT_BATCH,
            voice: None,
        }
    }
}

struct Session {
    id: SessionId,
    utterance: Arc<Utterance>,
    /// Clock reading at which offset 0 would have started.
    started_at: f64,
}

// ── Controller ─────────────────────────────────────────────────────

/// Generates, caches and plays synthesized speech for one utterance at a
/// time.
///
/// Driven through `&mut self` by a single task; the speech request in
/// [`play`](Self::play) is the only await point.
pub struct PlaybackController {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output: Arc<dyn AudioOutput>,
    clock: Arc<dyn Clock>,
    cache: SpeechCache,
    voice: Option<String>,

    state: PlaybackState,
    session: Option<Session>,
    current_offset: f64,
    /// Raw text of the last utterance requested; used to detect resume.
    current_text: Option<String>,
    next_session: u64,

    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
    completion_tx: mpsc::UnboundedSender<SessionId>,
    completion_rx: mpsc::UnboundedReceiver<SessionId>,
}

impl PlaybackController {
    /// Create a controller and the receiver for its [`PlaybackEvent`]s.
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        output: Arc<dyn AudioOutput>,
        clock: Arc<dyn Clock>,
        config: ControllerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let controller = Self {
            synthesizer,
            output,
            clock,
            cache: SpeechCache::new(config.cache_size, config.evict_batch),
            voice: config.voice,
            state: PlaybackState::Idle,
            session: None,
            current_offset: 0.0,
            current_text: None,
            next_session: 0,
            event_tx,
            completion_tx,
            completion_rx,
        };

        (controller, event_rx)
    }

    // ── Queries ────────────────────────────────────────────────────

    #[must_use]
    pub const fn status(&self) -> PlaybackState {
        self.state
    }

    /// Playing flag, position and duration of the current utterance.
    #[must_use]
    pub fn state(&self) -> PlaybackSnapshot {
        let duration = self
            .session
            .as_ref()
            .map(|s| s.utterance.duration())
            .or_else(|| {
                self.current_text
                    .as_deref()
                    .and_then(|t| self.cache.get(t))
                    .map(|u| u.duration())
            })
            .unwrap_or(0.0);

        PlaybackSnapshot {
            is_playing: self.state == PlaybackState::Playing,
            current_offset: self.position(),
            duration,
        }
    }

    /// Raw text of the utterance playing, paused or loading.
    #[must_use]
    pub fn current_text(&self) -> Option<&str> {
        self.current_text.as_deref()
    }

    #[must_use]
    pub const fn cache(&self) -> &SpeechCache {
        &self.cache
    }

    // ── Generation ─────────────────────────────────────────────────

    /// Synthesized audio for `text`, from the cache when possible.
    ///
    /// Text is cleaned of links and URLs before it reaches the provider but
    /// cached under the raw input.
    pub async fn generate_speech(&mut self, text: &str) -> Result<Arc<Utterance>, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyInput);
        }

        if let Some(cached) = self.cache.get(text) {
            tracing::debug!(chars = text.len(), "Using cached TTS audio");
            return Ok(cached);
        }

        let cleaned = clean_for_speech(text);
        if cleaned.trim().is_empty() {
            return Err(VoiceError::EmptyInput);
        }

        let request = SynthesisRequest {
            text: cleaned.clone(),
            voice: self.voice.clone(),
        };
        tracing::debug!(
            provider = self.synthesizer.name(),
            chars = cleaned.len(),
            "Generating speech"
        );
        let audio = self.synthesizer.synthesize(&request).await?;
        let clip = decode(&audio.bytes, audio.format)?;

        let utterance = Arc::new(Utterance {
            text: text.to_string(),
            cleaned_text: cleaned,
            clip: Arc::new(clip),
            produced_at: Instant::now(),
        });
        self.cache.insert(Arc::clone(&utterance));

        tracing::debug!(duration = utterance.duration(), "Speech generated");
        Ok(utterance)
    }

    // ── Transport ──────────────────────────────────────────────────

    /// Play `text`, superseding whatever is playing.
    ///
    /// Playing the same text that was paused (or stopped without a full
    /// reset) resumes from where it left off; any other text starts at 0.
    /// On failure the controller is `Idle` with offset 0.
    pub async fn play(&mut self, text: &str) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyInput);
        }

        let resume_at = if self.current_text.as_deref() == Some(text) {
            self.position()
        } else {
            0.0
        };

        self.halt_device();
        self.session = None;
        self.current_text = Some(text.to_string());
        self.current_offset = resume_at;
        self.set_state(PlaybackState::Loading);

        let result = match self.generate_speech(text).await {
            Ok(utterance) => self.start_session(utterance, resume_at),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.set_state(PlaybackState::Playing);
                Ok(())
            }
            Err(e) => {
                self.fail(&e, "Read-aloud failed");
                Err(e)
            }
        }
    }

    /// Pause at the current position. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.current_offset = self.position();
        self.halt_device();
        self.set_state(PlaybackState::Paused);
        tracing::debug!(offset = self.current_offset, "Playback paused");
    }

    /// Move by `delta` seconds, clamped to the utterance.
    ///
    /// While playing the device restarts at the new offset under a new
    /// session; while paused only the stored offset moves. No-op when
    /// nothing is loaded or `delta` is not a finite number. A failed restart
    /// leaves the controller `Idle` and emits [`PlaybackEvent::Error`].
    pub fn seek(&mut self, delta: f64) -> Result<(), VoiceError> {
        if !delta.is_finite() {
            tracing::debug!(delta, "Ignoring non-finite seek");
            return Ok(());
        }
        let Some(utterance) = self.session.as_ref().map(|s| Arc::clone(&s.utterance)) else {
            return Ok(());
        };

        let target = (self.position() + delta).clamp(0.0, utterance.duration());
        match self.state {
            PlaybackState::Playing => {
                self.halt_device();
                if let Err(e) = self.start_session(utterance, target) {
                    self.fail(&e, "Seek failed");
                    return Err(e);
                }
            }
            PlaybackState::Paused => self.current_offset = target,
            PlaybackState::Idle | PlaybackState::Loading => return Ok(()),
        }

        tracing::debug!(delta, offset = target, "Seeked");
        Ok(())
    }

    /// Stop playback.
    ///
    /// `full_reset` rewinds to 0; otherwise the position is kept so that
    /// playing the same text again resumes.
    pub fn stop(&mut self, full_reset: bool) {
        let offset = self.position();
        self.halt_device();
        self.session = None;
        if full_reset {
            self.current_offset = 0.0;
            self.current_text = None;
        } else {
            self.current_offset = offset;
        }
        self.set_state(PlaybackState::Idle);
    }

    // ── Completion ─────────────────────────────────────────────────

    /// Handle natural completion reported for `session`.
    ///
    /// Returns `true` when it was the current session and the controller
    /// went back to `Idle`.
    pub fn on_complete(&mut self, session: SessionId) -> bool {
        let current = self.session.as_ref().map(|s| s.id);
        if self.state != PlaybackState::Playing || current != Some(session) {
            tracing::debug!(%session, "Ignoring stale completion");
            return false;
        }

        self.session = None;
        self.current_offset = 0.0;
        self.set_state(PlaybackState::Idle);
        self.emit(PlaybackEvent::Finished { session });
        true
    }

    /// Wait for the current session to finish.
    ///
    /// Stale signals are consumed and skipped. Pending forever while nothing
    /// finishes, so it is meant for `tokio::select!`.
    pub async fn next_completion(&mut self) -> Option<SessionId> {
        loop {
            let session = self.completion_rx.recv().await?;
            if self.on_complete(session) {
                return Some(session);
            }
        }
    }

    /// Apply every completion signal already delivered. Returns how many
    /// finished the current session (0 or 1).
    pub fn poll_completions(&mut self) -> usize {
        let mut finished = 0;
        while let Ok(session) = self.completion_rx.try_recv() {
            if self.on_complete(session) {
                finished += 1;
            }
        }
        finished
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Seconds into the current utterance, clamped to its length.
    fn position(&self) -> f64 {
        match (&self.session, self.state) {
            (Some(session), PlaybackState::Playing) => {
                let elapsed = self.clock.now() - session.started_at;
                elapsed.clamp(0.0, session.utterance.duration())
            }
            _ => self.current_offset,
        }
    }

    fn start_session(&mut self, utterance: Arc<Utterance>, offset: f64) -> Result<(), VoiceError> {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, utterance.duration())
        } else {
            0.0
        };
        self.next_session += 1;
        let id = SessionId(self.next_session);

        self.output.prepare()?;
        let notifier = CompletionNotifier::new(id, self.completion_tx.clone());
        self.output.start(Arc::clone(&utterance.clip), offset, notifier)?;

        self.session = Some(Session {
            id,
            utterance,
            started_at: self.clock.now() - offset,
        });
        self.current_offset = offset;

        tracing::debug!(session = %id, offset, "Playback session started");
        self.emit(PlaybackEvent::Started {
            session: id,
            offset,
        });
        Ok(())
    }

    /// Stop the device, logging rather than failing.
    fn halt_device(&self) {
        if let Err(e) = self.output.stop() {
            tracing::warn!(error = %e, "Failed to stop audio output");
        }
    }

    fn reset_to_idle(&mut self) {
        self.halt_device();
        self.session = None;
        self.current_offset = 0.0;
        self.current_text = None;
        self.set_state(PlaybackState::Idle);
    }

    /// Drop to `Idle` and report `err` to listeners.
    fn fail(&mut self, err: &VoiceError, context: &'static str) {
        tracing::error!(error = %err, "{context}");
        self.reset_to_idle();
        self.emit(PlaybackEvent::Error {
            message: err.to_string(),
        });
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "Playback state changed");
        self.state = state;
        self.emit(PlaybackEvent::StateChanged { state });
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("provider", &self.synthesizer.name())
            .field("state", &self.state)
            .field("current_offset", &self.current_offset)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
