//! Retry wrapper for calls to the chat and speech APIs.
//!
//! Failures are retried with a linearly growing delay. Authentication
//! failures are returned immediately since repeating them cannot succeed.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Default number of attempts (the first call included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default delay before the second attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Coarse category of an API failure, derived from its message.
///
/// HTTP adapters embed the status code in their error messages, which is
/// what the classification keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401 / 403: bad or missing API key.
    Auth,
    /// 429: the provider is throttling us.
    RateLimit,
    /// Transport failure before any response.
    Network,
    /// Anything else the API reported.
    Api,
}

impl ErrorKind {
    /// Classify an error message.
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();
        if message.contains("401") || message.contains("403") {
            Self::Auth
        } else if message.contains("429") {
            Self::RateLimit
        } else if lowered.contains("network") || lowered.contains("fetch") {
            Self::Network
        } else {
            Self::Api
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub const fn is_retryable(self) -> bool {
        !matches!(self, Self::Auth)
    }

    /// User-facing description of the failure.
    pub fn user_message(self, original: &str) -> String {
        match self {
            Self::Auth => "Authentication failed. Please check your API key.".to_string(),
            Self::RateLimit => {
                "Rate limit exceeded. Please wait a moment before trying again.".to_string()
            }
            Self::Network => "Network error. Please check your internet connection.".to_string(),
            Self::Api if original.trim().is_empty() => {
                "Failed to communicate with the assistant.".to_string()
            }
            Self::Api => original.to_string(),
        }
    }
}

/// Run `operation` up to `max_attempts` times.
///
/// Attempt `n` that fails (and is not the last) is followed by a sleep of
/// `base_delay * n`. Auth failures are never retried.
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let message = err.to_string();
                if attempt >= max_attempts || !ErrorKind::classify(&message).is_retryable() {
                    return Err(err);
                }
                tracing::warn!(attempt, error = %message, "Attempt failed, retrying");
                tokio::time::sleep(base_delay * attempt).await;
                attempt += 1;
            }
        }
    }
}
