//! Per-component configuration.
//!
//! Plain structs with `Default` impls, in the shape of
//! `synapsed_promise::trust::TrustModelConfig` — no multi-source config
//! loader (the ecosystem's `synapsed-core::config::ConfigSource` machinery
//! is overkill for one crate; see DESIGN.md).

use serde::{Deserialize, Serialize};

/// Configuration for the [`crate::graph::TrustGraphStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Default edge TTL in hours when none is supplied on write.
    pub default_ttl_hours: f64,
    /// Decay rate used by `apply_decay` (fraction per day, continuous).
    pub decay_rate: f64,
    /// When true, `update_trust`/`update_trust_batch` skip the weighted
    /// merge and counter bookkeeping in favor of direct assignment.
    pub high_performance: bool,
    /// Path to autosave the snapshot to after mutations, if any.
    pub autosave_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: 8760.0,
            decay_rate: 0.1,
            high_performance: false,
            autosave_path: None,
        }
    }
}

/// Configuration for the [`crate::analyzer::PathAnalyzer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Maximum hops a path may take.
    pub max_path_length: usize,
    /// Maximum number of ranked paths to collect per query.
    pub max_paths: usize,
    /// Minimum confidence product a frontier state may retain.
    pub min_confidence: f64,
    /// Multiplicative per-hop penalty applied to composite path trust.
    pub decay_factor: f64,
    /// Minimum edge score for two agents to be considered connected when
    /// forming trust clusters.
    pub min_trust: f64,
    /// Cache TTL, in seconds, for per-`(source, target)` analyses.
    pub cache_ttl_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_path_length: 5,
            max_paths: 10,
            min_confidence: 0.1,
            decay_factor: 0.8,
            min_trust: 0.5,
            cache_ttl_secs: 3600,
        }
    }
}

/// Configuration for the [`crate::metrics::MetricsEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Cache TTL, in seconds, for per-agent and network metric caches.
    pub cache_ttl_secs: u64,
    /// Edge score threshold used by `trust_reachability`.
    pub reachability_min_score: f64,
    /// Average trust score at or above which an agent is "high trust".
    pub high_trust_threshold: f64,
    /// Average trust score at or below which an agent is "low trust".
    pub low_trust_threshold: f64,
    /// Maximum number of agent pairs sampled for `trust_efficiency`.
    pub efficiency_sample_pairs: usize,
    /// Maximum number of node deletions sampled for `trust_resilience`.
    pub resilience_sample_nodes: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            reachability_min_score: 0.3,
            high_trust_threshold: 0.7,
            low_trust_threshold: 0.3,
            efficiency_sample_pairs: 50,
            resilience_sample_nodes: 10,
        }
    }
}

/// Configuration for the [`crate::behavior::BehaviorModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Trait names seeded at neutral values when an agent is first
    /// registered (Big-Five plus the spec's extended set).
    pub standard_traits: Vec<String>,
    /// Pattern names seeded when an agent is first registered.
    pub standard_patterns: Vec<String>,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            standard_traits: vec![
                "openness".to_string(),
                "conscientiousness".to_string(),
                "extraversion".to_string(),
                "agreeableness".to_string(),
                "neuroticism".to_string(),
                "curiosity".to_string(),
                "persistence".to_string(),
                "creativity".to_string(),
                "analytical".to_string(),
                "practical".to_string(),
            ],
            standard_patterns: vec![
                "consistency".to_string(),
                "adaptability".to_string(),
                "collaboration".to_string(),
                "competition".to_string(),
                "innovation".to_string(),
                "caution".to_string(),
                "speed".to_string(),
                "quality".to_string(),
                "communication".to_string(),
                "learning".to_string(),
            ],
        }
    }
}
