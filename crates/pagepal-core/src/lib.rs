//! Core types for PagePal: settings, retry policy and reply-intent helpers.
//!
//! Nothing here touches audio or the network directly; the voice crate and
//! the CLI build on these types.

pub mod intent;
pub mod retry;
pub mod settings;

pub use intent::{
    PendingAction, detect_pending_action, is_affirmative, is_negative, resolve_search_query,
};
pub use retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, ErrorKind, with_retry};
pub use settings::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SEEK_STEP_SECS, DEFAULT_TTS_CACHE_EVICT,
    DEFAULT_TTS_CACHE_SIZE, Settings, SettingsError, TtsProvider, validate_settings,
};
