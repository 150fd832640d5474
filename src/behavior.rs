//! Behavior Model: per-agent personality traits, behavioral patterns, and
//! qualitative behavior prediction (spec.md §4.4).
//!
//! Owns its agent records independently of the Trust Graph Store;
//! integration with it and with the Metrics Engine is by `AgentId` key,
//! not by pointer (spec.md §3.3) — the same `DashMap`-keyed-by-id shape
//! `synapsed_promise::trust::TrustModel` uses for its `reputations` map.

use crate::config::BehaviorConfig;
use crate::types::{clamp, now, AgentId, Metadata};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A single personality trait, `value` and `confidence` both maintained
/// by weighted moving average (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityTrait {
    pub value: f64,
    pub confidence: f64,
    pub evidence_count: u32,
    pub last_updated: DateTime<Utc>,
    pub metadata: Metadata,
}

impl PersonalityTrait {
    fn neutral() -> Self {
        Self {
            value: 0.0,
            confidence: 0.0,
            evidence_count: 0,
            last_updated: now(),
            metadata: Metadata::new(),
        }
    }

    /// `w = 1/(evidence_count+1)`, both `value` and `confidence` clamped
    /// after the update (spec.md §9 Open Questions: this crate resolves
    /// the source's unclamped-trait ambiguity by clamping, matching the
    /// edge merge algebra).
    fn update(&mut self, sample: f64, sample_confidence: f64) {
        let w = 1.0 / (self.evidence_count as f64 + 1.0);
        self.value = clamp(self.value * (1.0 - w) + sample * w, -1.0, 1.0);
        self.confidence = clamp(self.confidence * (1.0 - w) + sample_confidence * w, 0.0, 1.0);
        self.evidence_count += 1;
        self.last_updated = now();
    }
}

/// A single behavioral pattern (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralPattern {
    pub frequency: f64,
    pub strength: f64,
    pub context: String,
    pub confidence: f64,
    pub observation_count: u32,
    pub first_observed: DateTime<Utc>,
    pub last_observed: DateTime<Utc>,
}

impl BehavioralPattern {
    fn neutral() -> Self {
        let t = now();
        Self {
            frequency: 0.0,
            strength: 0.0,
            context: "general".to_string(),
            confidence: 0.0,
            observation_count: 0,
            first_observed: t,
            last_observed: t,
        }
    }

    fn update(&mut self, frequency: f64, strength: f64, confidence: f64, context: Option<String>) {
        let w = 1.0 / (self.observation_count as f64 + 1.0);
        self.frequency = clamp(self.frequency * (1.0 - w) + frequency * w, 0.0, 1.0);
        self.strength = clamp(self.strength * (1.0 - w) + strength * w, -1.0, 1.0);
        self.confidence = clamp(self.confidence * (1.0 - w) + confidence * w, 0.0, 1.0);
        if let Some(c) = context {
            self.context = c;
        }
        self.observation_count += 1;
        self.last_observed = now();
    }
}

/// Whether an interaction outcome counted as success, failure, or neither
/// (spec.md §3.2 invariant 6, §9 Open Questions: a zero-score outcome is
/// treated as neither).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    Success,
    Failure,
    Neutral,
}

/// Aggregate behavioral record for one agent (spec.md §3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBehavior {
    pub agent_id: AgentId,
    pub traits: HashMap<String, PersonalityTrait>,
    pub patterns: HashMap<String, BehavioralPattern>,
    pub total_interactions: u64,
    pub successful_interactions: u64,
    pub failed_interactions: u64,
    pub specializations: HashSet<String>,
}

impl AgentBehavior {
    fn new(agent_id: AgentId, config: &BehaviorConfig) -> Self {
        let traits = config
            .standard_traits
            .iter()
            .map(|name| (name.clone(), PersonalityTrait::neutral()))
            .collect();
        let patterns = config
            .standard_patterns
            .iter()
            .map(|name| (name.clone(), BehavioralPattern::neutral()))
            .collect();
        Self {
            agent_id,
            traits,
            patterns,
            total_interactions: 0,
            successful_interactions: 0,
            failed_interactions: 0,
            specializations: HashSet::new(),
        }
    }
}

/// Qualitative communication register (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationStyle {
    Reserved,
    Neutral,
    Expressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionSpeed {
    Fast,
    Medium,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

/// Output of [`BehaviorModel::predict_behavior`] (spec.md §4.4). The
/// multiplicative adjustments are not clamped — downstream consumers
/// treat them as qualitative hints, per spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorPrediction {
    pub reliability: f64,
    pub collaboration_tendency: f64,
    pub adaptability: f64,
    pub expected_success_rate: f64,
    pub communication_style: CommunicationStyle,
    pub decision_speed: DecisionSpeed,
    pub risk_tolerance: RiskTolerance,
}

const HIGH: f64 = 0.5;
const LOW: f64 = -0.5;

/// Maintains per-agent personality traits and behavioral patterns and
/// derives qualitative scores and predictions from them (spec.md §4.4).
pub struct BehaviorModel {
    config: BehaviorConfig,
    agents: DashMap<AgentId, AgentBehavior>,
}

impl BehaviorModel {
    pub fn new(config: BehaviorConfig) -> Self {
        Self {
            config,
            agents: DashMap::new(),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(BehaviorConfig::default())
    }

    /// Registers an agent, seeding the standard trait/pattern set at
    /// neutral values if not already present (spec.md §3.1).
    pub fn register_agent(&self, agent_id: AgentId) {
        self.agents
            .entry(agent_id.clone())
            .or_insert_with(|| AgentBehavior::new(agent_id, &self.config));
    }

    fn ensure(&self, agent_id: &AgentId) {
        if !self.agents.contains_key(agent_id) {
            self.register_agent(agent_id.clone());
        }
    }

    /// Weighted-moving-average update of a personality trait
    /// (spec.md §4.4). Inputs are clamped at this boundary.
    pub fn update_trait(&self, agent_id: &AgentId, trait_name: &str, value: f64, confidence: f64) {
        self.ensure(agent_id);
        let value = clamp(value, -1.0, 1.0);
        let confidence = clamp(confidence, 0.0, 1.0);
        if let Some(mut entry) = self.agents.get_mut(agent_id) {
            entry
                .traits
                .entry(trait_name.to_string())
                .or_insert_with(PersonalityTrait::neutral)
                .update(value, confidence);
        }
        debug!(%agent_id, trait_name, value, "trait updated");
    }

    /// Weighted-moving-average update of a behavioral pattern
    /// (spec.md §4.4).
    pub fn update_pattern(
        &self,
        agent_id: &AgentId,
        pattern_name: &str,
        frequency: f64,
        strength: f64,
        confidence: f64,
        context: Option<String>,
    ) {
        self.ensure(agent_id);
        let frequency = clamp(frequency, 0.0, 1.0);
        let strength = clamp(strength, -1.0, 1.0);
        let confidence = clamp(confidence, 0.0, 1.0);
        if let Some(mut entry) = self.agents.get_mut(agent_id) {
            entry
                .patterns
                .entry(pattern_name.to_string())
                .or_insert_with(BehavioralPattern::neutral)
                .update(frequency, strength, confidence, context);
        }
    }

    /// Records an interaction outcome for `agent_id` (spec.md §3.2
    /// invariant 6, applied here to the Behavior Model's own counters).
    pub fn record_interaction(&self, agent_id: &AgentId, outcome: InteractionOutcome) {
        self.ensure(agent_id);
        if let Some(mut entry) = self.agents.get_mut(agent_id) {
            entry.total_interactions += 1;
            match outcome {
                InteractionOutcome::Success => entry.successful_interactions += 1,
                InteractionOutcome::Failure => entry.failed_interactions += 1,
                InteractionOutcome::Neutral => {}
            }
        }
    }

    pub fn add_specialization(&self, agent_id: &AgentId, specialization: impl Into<String>) {
        self.ensure(agent_id);
        if let Some(mut entry) = self.agents.get_mut(agent_id) {
            entry.specializations.insert(specialization.into());
        }
    }

    pub fn get_behavior(&self, agent_id: &AgentId) -> Option<AgentBehavior> {
        self.agents.get(agent_id).map(|e| e.clone())
    }

    /// Returns every agent record, for persistence export.
    pub fn all_agents(&self) -> Vec<AgentBehavior> {
        self.agents.iter().map(|e| e.value().clone()).collect()
    }

    /// Replaces or inserts an agent record wholesale, for persistence
    /// import.
    pub fn restore_agent(&self, agent: AgentBehavior) {
        self.agents.insert(agent.agent_id.clone(), agent);
    }

    /// `successful / total`, 0 if there have been no interactions
    /// (spec.md §4.4).
    pub fn success_rate(&self, agent_id: &AgentId) -> f64 {
        match self.agents.get(agent_id) {
            Some(a) if a.total_interactions > 0 => {
                a.successful_interactions as f64 / a.total_interactions as f64
            }
            _ => 0.0,
        }
    }

    pub fn total_interactions(&self, agent_id: &AgentId) -> u64 {
        self.agents.get(agent_id).map(|a| a.total_interactions).unwrap_or(0)
    }

    pub fn specializations(&self, agent_id: &AgentId) -> Vec<String> {
        self.agents
            .get(agent_id)
            .map(|a| a.specializations.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Average of `success_rate` and the normalized `consistency`
    /// pattern strength, if present; else just `success_rate`
    /// (spec.md §4.4).
    pub fn reliability_score(&self, agent_id: &AgentId) -> f64 {
        let success_rate = self.success_rate(agent_id);
        match self.agents.get(agent_id).and_then(|a| a.patterns.get("consistency").cloned()) {
            Some(pattern) => (success_rate + normalize_strength(pattern.strength)) / 2.0,
            None => success_rate,
        }
    }

    /// Normalized `collaboration` pattern strength, 0.5 (neutral) if
    /// absent (spec.md §4.4).
    pub fn collaboration_score(&self, agent_id: &AgentId) -> f64 {
        self.pattern_score(agent_id, "collaboration")
    }

    /// Normalized `adaptability` pattern strength, 0.5 (neutral) if
    /// absent (spec.md §4.4).
    pub fn adaptability_score(&self, agent_id: &AgentId) -> f64 {
        self.pattern_score(agent_id, "adaptability")
    }

    fn pattern_score(&self, agent_id: &AgentId, pattern_name: &str) -> f64 {
        self.agents
            .get(agent_id)
            .and_then(|a| a.patterns.get(pattern_name).map(|p| normalize_strength(p.strength)))
            .unwrap_or(0.5)
    }

    fn trait_value(&self, agent_id: &AgentId, trait_name: &str) -> f64 {
        self.agents
            .get(agent_id)
            .and_then(|a| a.traits.get(trait_name).map(|t| t.value))
            .unwrap_or(0.0)
    }

    fn pattern_strength(&self, agent_id: &AgentId, pattern_name: &str) -> f64 {
        self.agents
            .get(agent_id)
            .and_then(|a| a.patterns.get(pattern_name).map(|p| p.strength))
            .unwrap_or(0.0)
    }

    /// Applies the rule chain of spec.md §4.4 in order, producing a
    /// qualitative behavior prediction for `agent_id` in `context`.
    pub fn predict_behavior(&self, agent_id: &AgentId, context: &str) -> BehaviorPrediction {
        let mut reliability = self.reliability_score(agent_id);
        let mut collaboration_tendency = self.collaboration_score(agent_id);
        let adaptability = self.adaptability_score(agent_id);
        let mut expected_success_rate = self.success_rate(agent_id);
        let mut communication_style = CommunicationStyle::Neutral;
        let mut decision_speed = DecisionSpeed::Medium;
        let mut risk_tolerance = RiskTolerance::Medium;

        // 1. conscientiousness
        let conscientiousness = self.trait_value(agent_id, "conscientiousness");
        if conscientiousness > HIGH {
            reliability *= 1.2;
            decision_speed = DecisionSpeed::Slow;
        } else if conscientiousness < LOW {
            reliability *= 0.8;
            decision_speed = DecisionSpeed::Fast;
        }

        // 2. extraversion
        let extraversion = self.trait_value(agent_id, "extraversion");
        if extraversion > HIGH {
            communication_style = CommunicationStyle::Expressive;
            collaboration_tendency *= 1.1;
        } else if extraversion < LOW {
            communication_style = CommunicationStyle::Reserved;
        }

        // 3. neuroticism
        let neuroticism = self.trait_value(agent_id, "neuroticism");
        if neuroticism > HIGH {
            risk_tolerance = RiskTolerance::Low;
        } else if neuroticism < LOW {
            risk_tolerance = RiskTolerance::High;
        }

        // 4. speed pattern
        let speed = self.pattern_strength(agent_id, "speed");
        if speed > HIGH {
            decision_speed = DecisionSpeed::Fast;
        } else if speed < LOW {
            decision_speed = DecisionSpeed::Slow;
        }

        // 5. caution pattern
        let caution = self.pattern_strength(agent_id, "caution");
        if caution > HIGH {
            risk_tolerance = RiskTolerance::Low;
        } else if caution < LOW {
            risk_tolerance = RiskTolerance::High;
        }

        // 6. specialization match
        if self.specializations(agent_id).iter().any(|s| s == context) {
            expected_success_rate *= 1.2;
            reliability *= 1.1;
        }

        BehaviorPrediction {
            reliability,
            collaboration_tendency,
            adaptability,
            expected_success_rate,
            communication_style,
            decision_speed,
            risk_tolerance,
        }
    }
}

/// Maps a `[-1, 1]` strength into `[0, 1]`.
fn normalize_strength(strength: f64) -> f64 {
    (strength + 1.0) / 2.0
}
