//! Read-aloud for PagePal: speech generation, caching and playback.
//!
//! The [`PlaybackController`] is the entry point. It pulls audio from a
//! [`SpeechSynthesizer`], keeps recent utterances in a [`SpeechCache`], and
//! drives an [`AudioOutput`] (normally [`RodioOutput`]).

mod audio_thread;
pub mod cache;
pub mod clock;
pub mod controller;
pub mod decode;
pub mod error;
pub mod output;
pub mod playback;
pub mod provider;
pub mod text;

pub use cache::{SpeechCache, Utterance};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    ControllerConfig, DEFAULT_CACHE_SIZE, DEFAULT_EVICT_BATCH, PlaybackController, PlaybackEvent,
    PlaybackSnapshot, PlaybackState,
};
pub use decode::{AudioClip, AudioFormat, decode};
pub use error::VoiceError;
pub use output::{AudioOutput, CompletionNotifier, SessionId};
pub use playback::RodioOutput;
pub use provider::{
    GeminiConfig, GeminiTts, OpenAiConfig, OpenAiSpeech, SpeechSynthesizer, SynthesisRequest,
    SynthesizedAudio,
};
pub use text::clean_for_speech;
