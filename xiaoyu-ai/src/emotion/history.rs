//! Bounded per-session emotion history
//!
//! Each session keeps a ring buffer of fused results (oldest evicted first).
//! The session map itself is bounded; the least recently used session is
//! dropped when a new one would exceed the limit.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;
use xiaoyu_common::BasicEmotion;

use super::enhanced::EmotionFeatures;

/// Session used when the caller does not name one
pub const DEFAULT_SESSION: &str = "default";

/// Summary of the most recent history entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionTrends {
    pub average_valence: f64,
    pub average_arousal: f64,
    pub primary_emotion: BasicEmotion,
    /// `max(0, 1 - stddev(valence))`; 0 when there is no history
    pub emotional_stability: f64,
}

impl EmotionTrends {
    fn empty() -> Self {
        Self {
            average_valence: 0.0,
            average_arousal: 0.0,
            primary_emotion: BasicEmotion::Neutral,
            emotional_stability: 0.0,
        }
    }
}

/// Fixed-capacity ring buffer of fused emotions
#[derive(Debug, Clone)]
pub struct EmotionHistory {
    entries: VecDeque<EmotionFeatures>,
    capacity: usize,
}

impl EmotionHistory {
    /// Capacity is clamped to at least one entry
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, emotion: EmotionFeatures) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(emotion);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from most recent to oldest
    pub fn recent(&self) -> impl Iterator<Item = &EmotionFeatures> {
        self.entries.iter().rev()
    }

    /// Trends over the last `window` entries
    ///
    /// Ties for the most frequent primary emotion go to the one seen first
    /// within the window.
    pub fn trends(&self, window: usize) -> EmotionTrends {
        let skip = self.entries.len().saturating_sub(window);
        let recent: Vec<&EmotionFeatures> = self.entries.iter().skip(skip).collect();

        if recent.is_empty() {
            return EmotionTrends::empty();
        }

        let n = recent.len() as f64;
        let average_valence = recent.iter().map(|e| e.valence).sum::<f64>() / n;
        let average_arousal = recent.iter().map(|e| e.arousal).sum::<f64>() / n;

        let mut counts: Vec<(BasicEmotion, usize)> = Vec::new();
        for entry in &recent {
            match counts.iter_mut().find(|(emotion, _)| *emotion == entry.primary) {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.primary, 1)),
            }
        }
        let mut primary_emotion = BasicEmotion::Neutral;
        let mut best = 0;
        for (emotion, count) in counts {
            if count > best {
                best = count;
                primary_emotion = emotion;
            }
        }

        let variance = recent
            .iter()
            .map(|e| (e.valence - average_valence).powi(2))
            .sum::<f64>()
            / n;

        EmotionTrends {
            average_valence,
            average_arousal,
            primary_emotion,
            emotional_stability: (1.0 - variance.sqrt()).max(0.0),
        }
    }
}

/// All live session histories
#[derive(Debug)]
pub struct SessionHistories {
    sessions: HashMap<String, (EmotionHistory, u64)>,
    history_capacity: usize,
    max_sessions: usize,
    tick: u64,
}

impl SessionHistories {
    pub fn new(history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            history_capacity,
            max_sessions: max_sessions.max(1),
            tick: 0,
        }
    }

    /// History of `session_id`, created (and marked most recently used) on demand
    pub fn session(&mut self, session_id: &str) -> &mut EmotionHistory {
        self.tick += 1;
        let tick = self.tick;

        if !self.sessions.contains_key(session_id) && self.sessions.len() >= self.max_sessions {
            self.evict_least_recent();
        }

        let capacity = self.history_capacity;
        let (history, last_used) = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| (EmotionHistory::new(capacity), tick));
        *last_used = tick;
        history
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, (_, last_used))| *last_used)
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            debug!(session = %id, "Evicting least recently used emotion session");
            self.sessions.remove(&id);
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
