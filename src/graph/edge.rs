//! Trust edges and the weighted-average merge algebra (spec.md §4.1).

use crate::types::{clamp, merge_metadata, now, AgentId, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directed trust assertion from `from_agent` about `to_agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustEdge {
    pub from_agent: AgentId,
    pub to_agent: AgentId,
    pub trust_score: f64,
    pub confidence: f64,
    pub interaction_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ttl_hours: f64,
    pub metadata: Metadata,
}

impl TrustEdge {
    pub fn new(
        from_agent: AgentId,
        to_agent: AgentId,
        trust_score: f64,
        confidence: f64,
        ttl_hours: f64,
        metadata: Metadata,
    ) -> Self {
        let t = now();
        Self {
            from_agent,
            to_agent,
            trust_score: clamp(trust_score, -1.0, 1.0),
            confidence: clamp(confidence, 0.0, 1.0),
            interaction_count: 1,
            created_at: t,
            updated_at: t,
            ttl_hours,
            metadata,
        }
    }

    /// Whether this edge is expired as of `at` (spec.md §3.2 invariant 4).
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        let age_hours = (at - self.updated_at).num_seconds() as f64 / 3600.0;
        age_hours > self.ttl_hours
    }

    /// Weighted-average merge of a new sample into the existing edge
    /// (spec.md §4.1 normal mode):
    ///
    /// ```text
    /// w   = 1 / (n + 1)
    /// s1  = clamp(s*(1-w) + s'*w, -1, 1)
    /// c1  = clamp(c*(1-w) + c'*w,  0, 1)
    /// n1  = n + 1
    /// ```
    pub fn merge(&mut self, new_score: f64, new_confidence: f64, metadata: Metadata) {
        let w = 1.0 / (self.interaction_count as f64 + 1.0);
        self.trust_score = clamp(
            self.trust_score * (1.0 - w) + new_score * w,
            -1.0,
            1.0,
        );
        self.confidence = clamp(
            self.confidence * (1.0 - w) + new_confidence * w,
            0.0,
            1.0,
        );
        self.interaction_count += 1;
        merge_metadata(&mut self.metadata, metadata);
        self.updated_at = now();
    }

    /// High-performance mode (spec.md §4.1): direct assignment, no
    /// weighted average.
    pub fn assign(&mut self, new_score: f64, new_confidence: f64, metadata: Metadata) {
        self.trust_score = clamp(new_score, -1.0, 1.0);
        self.confidence = clamp(new_confidence, 0.0, 1.0);
        self.interaction_count += 1;
        merge_metadata(&mut self.metadata, metadata);
        self.updated_at = now();
    }

    /// Multiplicative decay toward zero (spec.md §4.1):
    /// `factor = exp(-decay_rate * hours_elapsed / 24)`.
    pub fn apply_decay(&mut self, decay_rate: f64, at: DateTime<Utc>) {
        let hours_elapsed = (at - self.updated_at).num_seconds() as f64 / 3600.0;
        if hours_elapsed <= 0.0 {
            return;
        }
        let factor = (-decay_rate * hours_elapsed / 24.0).exp();
        self.trust_score = clamp(self.trust_score * factor, -1.0, 1.0);
        self.confidence = clamp(self.confidence * factor, 0.0, 1.0);
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn weighted_merge_matches_spec_scenario_1() {
        let mut e = TrustEdge::new(
            "A".into(),
            "B".into(),
            0.8,
            0.9,
            8760.0,
            HashMap::new(),
        );
        e.merge(-0.3, 0.7, HashMap::new());
        assert!((e.trust_score - 0.25).abs() < 1e-9);
        assert_eq!(e.interaction_count, 2);
    }

    #[test]
    fn clamps_out_of_range_inputs() {
        let e = TrustEdge::new("A".into(), "B".into(), 2.0, 1.0, 8760.0, HashMap::new());
        assert_eq!(e.trust_score, 1.0);
        let e = TrustEdge::new("A".into(), "B".into(), -2.0, 1.0, 8760.0, HashMap::new());
        assert_eq!(e.trust_score, -1.0);
    }

    #[test]
    fn decay_shrinks_magnitude() {
        let mut e = TrustEdge::new("A".into(), "B".into(), 0.8, 0.9, 8760.0, HashMap::new());
        let later = e.updated_at + chrono::Duration::hours(24);
        e.apply_decay(0.1, later);
        assert!(e.trust_score < 0.8);
        assert!(e.trust_score > 0.0);
    }
}
