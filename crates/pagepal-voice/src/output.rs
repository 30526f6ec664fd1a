//! Audio output abstraction.
//!
//! The controller drives an [`AudioOutput`] and never touches the audio
//! hardware directly. Natural completion is reported back through a
//! [`CompletionNotifier`] tagged with the session it belongs to, so a late
//! signal from a superseded session can be told apart from the current one.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::decode::AudioClip;
use crate::error::VoiceError;

/// Identifies one start of the output device.
///
/// Every `play` and every seek while playing gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One-shot completion signal handed to the output device with each start.
#[derive(Debug, Clone)]
pub struct CompletionNotifier {
    session: SessionId,
    tx: mpsc::UnboundedSender<SessionId>,
}

impl CompletionNotifier {
    pub(crate) const fn new(session: SessionId, tx: mpsc::UnboundedSender<SessionId>) -> Self {
        Self { session, tx }
    }

    /// Session this notifier reports for.
    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Report that playback drained naturally.
    ///
    /// Must not be called when playback was stopped. Silently does nothing
    /// once the controller is gone.
    pub fn notify(self) {
        let _ = self.tx.send(self.session);
    }
}

/// A device able to play decoded clips.
///
/// Methods take `&self`; implementations synchronise internally.
pub trait AudioOutput: Send + Sync {
    /// Create or resume the underlying device. Called before every start.
    fn prepare(&self) -> Result<(), VoiceError>;

    /// Stop anything playing and start `clip` at `offset_secs`.
    ///
    /// `notifier` fires once if and only if the clip plays to the end.
    fn start(
        &self,
        clip: Arc<AudioClip>,
        offset_secs: f64,
        notifier: CompletionNotifier,
    ) -> Result<(), VoiceError>;

    /// Stop playback. Stopping an idle device is not an error.
    fn stop(&self) -> Result<(), VoiceError>;
}
