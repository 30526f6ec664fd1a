//! Pending-action detection for assistant replies.
//!
//! When the assistant offers to run a web search ("Would you like me to
//! search for …?"), the offer is remembered as a [`PendingAction`]. The next
//! user message is then checked with [`is_affirmative`] / [`is_negative`]
//! before it is sent to the model. Detection is a plain pattern match; vague
//! captures ("that information") are only repaired at execution time by
//! [`resolve_search_query`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SEARCH_OFFER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:would you like me to|should i|do you want me to|i can|i can certainly) (?:search|check|look up|find) (?:for )?(.+?)(\?|$|\.|,| with a quick search| if you'd like)",
    )
    .expect("search offer pattern is valid")
});

static AFFIRMATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(yes|yeah|yep|sure|ok|okay|do it|go ahead|please do|yup|i would|yes please)$")
        .expect("affirmative pattern is valid")
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(no|nah|nope|stop|cancel|don't|no thanks)$")
        .expect("negative pattern is valid")
});

/// Trailing phrases dropped from a captured query, in order.
const QUERY_SUFFIXES: [&str; 4] = [
    " for you",
    " with a quick search",
    " if you'd like",
    " that information",
];

/// Queries too vague to search for on their own.
const VAGUE_TERMS: [&str; 5] = ["that information", "that", "it", "the info", "this"];

/// An action the assistant offered and the user may confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum PendingAction {
    SearchWeb { query: String },
}

/// Look for an offer to search in an assistant reply.
pub fn detect_pending_action(ai_text: &str) -> Option<PendingAction> {
    let captures = SEARCH_OFFER.captures(ai_text)?;
    let raw = captures.get(1)?.as_str().trim();
    if raw.is_empty() {
        return None;
    }

    let mut query = raw.to_string();
    for suffix in QUERY_SUFFIXES {
        query = strip_suffix_ignore_case(&query, suffix).to_string();
    }

    tracing::debug!(%query, "Pending search action detected");
    Some(PendingAction::SearchWeb { query })
}

/// Whether a user reply accepts the pending action.
pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE.is_match(text.trim())
}

/// Whether a user reply declines the pending action.
pub fn is_negative(text: &str) -> bool {
    NEGATIVE.is_match(text.trim())
}

/// Pick the query to actually search for.
///
/// Vague captures fall back to the most recent user message, when there is
/// one.
pub fn resolve_search_query(query: &str, last_user_message: Option<&str>) -> String {
    let lowered = query.to_lowercase();
    let vague = VAGUE_TERMS.contains(&lowered.as_str()) || query.chars().count() < 3;

    match last_user_message {
        Some(previous) if vague => previous.to_string(),
        _ => query.to_string(),
    }
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> &'a str {
    let Some(split) = text.len().checked_sub(suffix.len()) else {
        return text;
    };
    match text.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(suffix) => &text[..split],
        _ => text,
    }
}
