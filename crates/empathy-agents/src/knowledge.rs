//! Fuzzy-similarity reward memory.
//!
//! Each robot carries a [`KnowledgeBase`]: an ordered, append-only list of
//! `(state, reward)` pairs seeded with domain priors. A new situation is
//! valued by a similarity-weighted average over *every* stored reward, and
//! genuinely novel situations are appended with that value.
//!
//! # Algorithm
//!
//! - `similarity(a, b) = 1 - sqrt(mean((a_i - b_i)^2))`. Not clamped: very
//!   dissimilar, large-magnitude vectors score below zero.
//! - `score(s) = sum(similarity(s, e.state) * e.reward) / len`.
//! - `record(s)`: if `s` is more similar than the threshold to *any* stored
//!   entry, count it as skipped; otherwise append `(s, score(s))`.
//!
//! The base is non-empty from construction onward, so `score` never
//! divides by zero.

use empathy_types::{STATE_FEATURES, StateVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KnowledgeConfig;
use crate::error::AgentError;

/// The eight reference priors and their rewards.
pub const REFERENCE_PRIORS: [([f64; STATE_FEATURES], f64); 8] = [
    ([0.9, 0.7, 0.5, 0.0, 0.0, 0.0], 0.9),
    ([0.5, 0.0, 0.0, 0.0, 0.0, 0.0], 0.3),
    ([0.6, 0.9, 0.1, 0.0, 0.0, 0.0], 0.6),
    ([0.8, 0.2, 0.0, 0.5, 0.3, 0.0], 0.7),
    ([0.9, 0.8, 0.8, 0.0, 0.0, 0.0], 1.0),
    ([0.1, 0.0, 0.0, 0.0, 0.0, 0.0], 0.1),
    ([0.3, 0.0, 0.0, 0.5, 0.9, 0.0], 0.5),
    ([0.7, 0.5, 0.5, 1.0, 0.6, 0.3], 0.8),
];

/// The reference priors as knowledge entries, in their canonical order.
pub fn reference_priors() -> Vec<KnowledgeEntry> {
    REFERENCE_PRIORS
        .iter()
        .map(|(state, reward)| KnowledgeEntry {
            state: StateVector::from_array(*state),
            reward: *reward,
        })
        .collect()
}

/// Similarity between two state vectors: one minus their RMS distance.
///
/// Exactly `1.0` for identical vectors and symmetric in its arguments.
pub fn similarity(a: &StateVector, b: &StateVector) -> f64 {
    let sum_sq: f64 = a
        .features()
        .iter()
        .zip(b.features())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let n = STATE_FEATURES as f64;
    1.0 - (sum_sq / n).sqrt()
}

/// One remembered situation and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// The remembered state.
    pub state: StateVector,
    /// Reward associated with it.
    pub reward: f64,
}

/// Result of offering a state to [`KnowledgeBase::record`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordOutcome {
    /// The state was novel and has been appended with this reward.
    Inserted {
        /// Score assigned to the new entry.
        reward: f64,
    },
    /// The state was too close to an existing entry.
    Skipped {
        /// The first similarity that exceeded the threshold.
        similarity: f64,
    },
}

/// A robot's append-only reward memory.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    threshold: f64,
    skipped: u64,
    analyzed: u64,
}

impl KnowledgeBase {
    /// Build a knowledge base from prior entries.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyKnowledge`] if `priors` is empty and
    /// [`AgentError::InvalidThreshold`] if `threshold` is not in `(0, 1]`.
    pub fn seeded(priors: Vec<KnowledgeEntry>, threshold: f64) -> Result<Self, AgentError> {
        if priors.is_empty() {
            return Err(AgentError::EmptyKnowledge);
        }
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(AgentError::InvalidThreshold(threshold));
        }
        Ok(Self {
            entries: priors,
            threshold,
            skipped: 0,
            analyzed: 0,
        })
    }

    /// Build a knowledge base from the `knowledge` config section.
    ///
    /// # Errors
    ///
    /// As [`KnowledgeBase::seeded`], plus [`AgentError::FeatureCount`] for a
    /// prior with the wrong number of features.
    pub fn from_config(config: &KnowledgeConfig) -> Result<Self, AgentError> {
        let priors = config
            .priors
            .iter()
            .enumerate()
            .map(|(index, prior)| {
                StateVector::from_slice(&prior.state)
                    .map(|state| KnowledgeEntry {
                        state,
                        reward: prior.reward,
                    })
                    .ok_or(AgentError::FeatureCount {
                        index,
                        expected: STATE_FEATURES,
                        found: prior.state.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::seeded(priors, config.similarity_threshold)
    }

    /// Similarity-weighted average of every stored reward.
    pub fn score(&self, state: &StateVector) -> f64 {
        let weighted: f64 = self
            .entries
            .iter()
            .map(|entry| similarity(state, &entry.state) * entry.reward)
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.entries.len() as f64;
        weighted / count
    }

    /// Offer a state to the novelty gate.
    ///
    /// The state is skipped if its similarity to any stored entry exceeds
    /// the threshold; otherwise it is scored against the current entries
    /// and appended.
    pub fn record(&mut self, state: StateVector) -> RecordOutcome {
        if let Some(similarity) = self
            .entries
            .iter()
            .map(|entry| similarity(&entry.state, &state))
            .find(|s| *s > self.threshold)
        {
            self.skipped = self.skipped.saturating_add(1);
            debug!(similarity, size = self.entries.len(), "State skipped");
            return RecordOutcome::Skipped { similarity };
        }

        let reward = self.score(&state);
        self.entries.push(KnowledgeEntry { state, reward });
        self.analyzed = self.analyzed.saturating_add(1);
        debug!(reward, size = self.entries.len(), "State recorded");
        RecordOutcome::Inserted { reward }
    }

    /// Stored entries in insertion order (priors first).
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Number of stored entries, priors included. Never zero.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The novelty threshold.
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// States rejected by the novelty gate so far.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// States accepted by the novelty gate so far.
    pub const fn analyzed(&self) -> u64 {
        self.analyzed
    }

    /// Percentage of offered states that were skipped, or `0.0` if none
    /// were offered yet.
    pub fn skip_percentage(&self) -> f64 {
        let total = self.skipped.saturating_add(self.analyzed);
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.skipped as f64 / total as f64 * 100.0;
        pct
    }
}
