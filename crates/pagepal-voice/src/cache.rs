//! Bounded cache of synthesized utterances.
//!
//! Replaying a message should not cost another provider round-trip, but a
//! long chat must not keep every answer's audio alive either. Entries are
//! keyed by the raw message text and kept in insertion order; once the cache
//! grows past its capacity the oldest batch is dropped in one go.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use crate::decode::AudioClip;

/// A message together with its synthesized audio.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Raw input text; the cache key.
    pub text: String,
    /// Text actually sent to the provider.
    pub cleaned_text: String,
    /// Decoded audio.
    pub clip: Arc<AudioClip>,
    /// When synthesis finished.
    pub produced_at: Instant,
}

impl Utterance {
    /// Length of the audio in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.clip.duration()
    }
}

/// Insertion-ordered utterance cache with batch eviction.
#[derive(Debug)]
pub struct SpeechCache {
    entries: HashMap<String, Arc<Utterance>>,
    order: VecDeque<String>,
    capacity: usize,
    evict_batch: usize,
}

impl SpeechCache {
    /// Create a cache holding at most `capacity` entries that drops the
    /// `evict_batch` oldest ones on overflow.
    ///
    /// Both bounds are raised to at least 1.
    #[must_use]
    pub fn new(capacity: usize, evict_batch: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            evict_batch: evict_batch.max(1),
        }
    }

    /// Cached utterance for `text`, if any.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<Utterance>> {
        self.entries.get(text).cloned()
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an utterance, evicting old entries if the cache overflows.
    ///
    /// Replacing an existing key keeps its original position. Returns the
    /// evicted keys, oldest first.
    pub fn insert(&mut self, utterance: Arc<Utterance>) -> Vec<String> {
        let key = utterance.text.clone();
        if self.entries.insert(key.clone(), utterance).is_none() {
            self.order.push_back(key);
        }

        if self.entries.len() <= self.capacity {
            return Vec::new();
        }

        // At least one batch, and never stop while still over capacity.
        let mut evicted = Vec::with_capacity(self.evict_batch);
        while evicted.len() < self.evict_batch || self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted.push(oldest);
        }

        tracing::info!(
            evicted = evicted.len(),
            remaining = self.entries.len(),
            "TTS cache cleaned"
        );
        evicted
    }
}
