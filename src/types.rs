//! Core types shared across the trust graph, analyzer, metrics, and behavior model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque identifier for an agent.
///
/// Any non-empty octet sequence is accepted; no semantic validation is
/// performed beyond rejecting the empty string. Case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Creates a new agent id, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::error::TrustGraphError> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::error::TrustGraphError::InvalidAgentId(
                "agent id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque, string-keyed attribute bag carried by nodes, edges, traits, and
/// patterns. Schema is the caller's responsibility.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Clamps a value into `[lo, hi]`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Shallow-merges `incoming` into `base`, new keys overwrite.
pub fn merge_metadata(base: &mut Metadata, incoming: Metadata) {
    for (k, v) in incoming {
        base.insert(k, v);
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
