//! Agent (node) records owned by the [`crate::graph::TrustGraphStore`].

use crate::types::{now, AgentId, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent as known to the Trust Graph Store.
///
/// `total_interactions`, `successful_interactions`, and
/// `failed_interactions` are the authoritative success/failure tally
/// (spec.md §3.2 invariant 6); `zero_score_updates` tracks the
/// `trust_score == 0` case the spec carves out as neither success nor
/// failure (spec.md §9 Open Questions, resolved in SPEC_FULL.md §F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentNode {
    pub agent_id: AgentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_interactions: u64,
    pub successful_interactions: u64,
    pub failed_interactions: u64,
    pub zero_score_updates: u64,
    pub metadata: Metadata,
}

impl AgentNode {
    pub fn new(agent_id: AgentId, metadata: Metadata) -> Self {
        let t = now();
        Self {
            agent_id,
            created_at: t,
            updated_at: t,
            total_interactions: 0,
            successful_interactions: 0,
            failed_interactions: 0,
            zero_score_updates: 0,
            metadata,
        }
    }

    /// Records the outcome of an `update_trust` call targeting an edge
    /// whose `to_agent` is this node (spec.md §3.2 invariant 6).
    pub fn record_outcome(&mut self, trust_score: f64) {
        self.total_interactions += 1;
        if trust_score > 0.0 {
            self.successful_interactions += 1;
        } else if trust_score < 0.0 {
            self.failed_interactions += 1;
        } else {
            self.zero_score_updates += 1;
        }
        self.updated_at = now();
    }
}
