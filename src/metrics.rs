//! Metrics Engine: per-agent and network-wide trust analytics
//! (spec.md §4.3).

use crate::analyzer::PathAnalyzer;
use crate::behavior::BehaviorModel;
use crate::cache::TtlCache;
use crate::config::MetricsConfig;
use crate::graph::TrustGraphStore;
use crate::types::AgentId;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralMetrics {
    pub success_rate: f64,
    pub total_interactions: u64,
    pub behavioral_reliability: f64,
    pub collaboration_tendency: f64,
    pub adaptability_score: f64,
    pub specializations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_id: AgentId,
    pub total_trust_score: f64,
    pub average_trust_score: f64,
    pub trust_consistency: f64,
    pub trust_volatility: f64,
    pub trust_centrality: f64,
    pub trust_reciprocity: f64,
    pub trust_clustering: f64,
    pub trust_reachability: f64,
    pub trust_influence: f64,
    pub trust_reliability: f64,
    pub confidence_score: f64,
    pub risk_score: f64,
    pub behavioral: Option<BehavioralMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub total_agents: usize,
    pub total_edges: usize,
    pub average_trust_score: f64,
    pub trust_density: f64,
    pub trust_clustering_coefficient: f64,
    pub trust_centralization: f64,
    pub trust_fragmentation: f64,
    pub trust_stability: f64,
    pub trust_efficiency: f64,
    pub trust_resilience: f64,
    pub high_trust_agents: usize,
    pub low_trust_agents: usize,
    pub trust_communities: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// A synthetic trend series (spec.md §4.3, §9: the store retains no
/// history, so this is fabricated from the agent's current metrics —
/// documented, not silently upgraded to real history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustTrend {
    pub agent_id: AgentId,
    pub period_days: u32,
    pub points: Vec<(DateTime<Utc>, f64)>,
    pub direction: TrendDirection,
}

pub struct MetricsEngine {
    config: MetricsConfig,
    store: Arc<TrustGraphStore>,
    analyzer: Arc<PathAnalyzer>,
    agent_cache: TtlCache<AgentId, AgentMetrics>,
    network_cache: TtlCache<&'static str, NetworkMetrics>,
}

impl MetricsEngine {
    pub fn new(store: Arc<TrustGraphStore>, analyzer: Arc<PathAnalyzer>, config: MetricsConfig) -> Self {
        let agent_cache = TtlCache::new(config.cache_ttl_secs);
        let network_cache = TtlCache::new(config.cache_ttl_secs);
        Self {
            config,
            store,
            analyzer,
            agent_cache,
            network_cache,
        }
    }

    pub fn clear_cache(&self) {
        self.agent_cache.clear();
        self.network_cache.clear();
    }

    /// Computes metrics for a single agent, optionally enriched with
    /// [`BehaviorModel`] data (spec.md §4.3).
    pub fn agent_metrics(&self, agent: &AgentId, behavior: Option<&BehaviorModel>) -> Option<AgentMetrics> {
        if self.store.get_node(agent).is_none() {
            return None;
        }
        if let Some(cached) = self.agent_cache.get(agent) {
            return Some(cached);
        }

        let all_ids = self.store.agent_ids();
        let n = all_ids.len();

        let incoming: Vec<_> = all_ids
            .iter()
            .filter_map(|other| self.store.get_edge(other, agent))
            .collect();
        let outgoing: Vec<_> = self
            .store
            .get_neighbors(agent)
            .iter()
            .filter_map(|other| self.store.get_edge(agent, other))
            .collect();

        let total_trust_score: f64 = incoming.iter().map(|e| e.trust_score).sum();
        let average_trust_score = if incoming.is_empty() {
            0.0
        } else {
            total_trust_score / incoming.len() as f64
        };

        let trust_consistency = if incoming.len() < 2 {
            0.0
        } else {
            let scores: Vec<f64> = incoming.iter().map(|e| e.trust_score).collect();
            1.0 - stdev(&scores).min(1.0)
        };

        let mean_incoming_confidence = if incoming.is_empty() {
            0.0
        } else {
            incoming.iter().map(|e| e.confidence).sum::<f64>() / incoming.len() as f64
        };
        let trust_volatility = 1.0 - mean_incoming_confidence;

        let trust_centrality = if n > 1 {
            (incoming.len() + outgoing.len()) as f64 / (n - 1) as f64
        } else {
            0.0
        };

        let trust_reciprocity = {
            let mut sum = 0.0;
            let mut count = 0usize;
            for other in &all_ids {
                if other == agent {
                    continue;
                }
                if let (Some(out_edge), Some(in_edge)) = (
                    self.store.get_edge(agent, other),
                    self.store.get_edge(other, agent),
                ) {
                    sum += 1.0 - (out_edge.trust_score - in_edge.trust_score).abs();
                    count += 1;
                }
            }
            if count == 0 {
                0.0
            } else {
                sum / count as f64
            }
        };

        let trust_clustering = local_clustering_coefficient(&self.store, agent);

        let trust_reachability = bfs_reachability_fraction(
            &self.store,
            agent,
            self.config.reachability_min_score,
            n,
        );

        let mean_outgoing_trust = if outgoing.is_empty() {
            0.0
        } else {
            outgoing.iter().map(|e| e.trust_score).sum::<f64>() / outgoing.len() as f64
        };
        let trust_influence = trust_centrality * mean_outgoing_trust;

        let trust_reliability = (trust_consistency + mean_incoming_confidence) / 2.0;
        let confidence_score = (trust_consistency + trust_reliability + (1.0 - trust_volatility)) / 3.0;
        let risk_score = 1.0 - trust_reliability;

        let behavioral = behavior.map(|b| {
            let success_rate = b.success_rate(agent);
            let reliability = b.reliability_score(agent);
            let collaboration = b.collaboration_score(agent);
            let adaptability = b.adaptability_score(agent);
            let interactions = b.total_interactions(agent);
            let specializations = b.specializations(agent);
            BehavioralMetrics {
                success_rate,
                total_interactions: interactions,
                behavioral_reliability: reliability,
                collaboration_tendency: collaboration,
                adaptability_score: adaptability,
                specializations,
            }
        });

        let metrics = AgentMetrics {
            agent_id: agent.clone(),
            total_trust_score,
            average_trust_score,
            trust_consistency,
            trust_volatility,
            trust_centrality,
            trust_reciprocity,
            trust_clustering,
            trust_reachability,
            trust_influence,
            trust_reliability,
            confidence_score,
            risk_score,
            behavioral,
        };
        self.agent_cache.insert(agent.clone(), metrics.clone());
        Some(metrics)
    }

    /// Network-wide analytics derived from every agent's metrics and the
    /// graph (spec.md §4.3).
    pub fn network_metrics(&self) -> NetworkMetrics {
        if let Some(cached) = self.network_cache.get(&"network") {
            return cached;
        }

        let ids = self.store.agent_ids();
        let n = ids.len();
        let edges = self.store.all_edges();
        let total_edges = edges.len();

        let average_trust_score = if edges.is_empty() {
            0.0
        } else {
            edges.iter().map(|e| e.trust_score).sum::<f64>() / edges.len() as f64
        };
        let trust_density = if n > 1 {
            total_edges as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };
        let trust_stability = if edges.is_empty() {
            0.0
        } else {
            edges.iter().map(|e| e.confidence).sum::<f64>() / edges.len() as f64
        };

        let per_agent: Vec<AgentMetrics> = ids
            .iter()
            .filter_map(|id| self.agent_metrics(id, None))
            .collect();

        let positive_clustering: Vec<f64> = per_agent
            .iter()
            .map(|m| m.trust_clustering)
            .filter(|c| *c > 0.0)
            .collect();
        let trust_clustering_coefficient = if positive_clustering.is_empty() {
            0.0
        } else {
            positive_clustering.iter().sum::<f64>() / positive_clustering.len() as f64
        };

        let centralities: Vec<f64> = per_agent.iter().map(|m| m.trust_centrality).collect();
        let trust_centralization = variance(&centralities).min(1.0).max(0.0);

        let clusters = self.analyzer.find_trust_clusters();
        let trust_fragmentation = if clusters.is_empty() || n == 0 {
            1.0
        } else {
            let mean_cluster_size =
                clusters.iter().map(|c| c.len()).sum::<usize>() as f64 / clusters.len() as f64;
            1.0 - (mean_cluster_size / n as f64)
        };

        let trust_efficiency = self.sample_efficiency(&ids);
        let trust_resilience = self.sample_resilience(&ids);

        let high_trust_agents = per_agent
            .iter()
            .filter(|m| m.average_trust_score >= self.config.high_trust_threshold)
            .count();
        let low_trust_agents = per_agent
            .iter()
            .filter(|m| m.average_trust_score <= self.config.low_trust_threshold)
            .count();

        let metrics = NetworkMetrics {
            total_agents: n,
            total_edges,
            average_trust_score,
            trust_density,
            trust_clustering_coefficient,
            trust_centralization,
            trust_fragmentation,
            trust_stability,
            trust_efficiency,
            trust_resilience,
            high_trust_agents,
            low_trust_agents,
            trust_communities: clusters.len(),
        };
        self.network_cache.insert("network", metrics.clone());
        debug!(total_agents = n, total_edges, "network metrics computed");
        metrics
    }

    /// `1 / (1 + mean_best_path_length)` sampled over up to
    /// `efficiency_sample_pairs` random pairs (spec.md §4.3).
    fn sample_efficiency(&self, ids: &[AgentId]) -> f64 {
        if ids.len() < 2 {
            return 0.0;
        }
        let mut rng = thread_rng();
        let mut pairs: Vec<(AgentId, AgentId)> = Vec::new();
        for a in ids {
            for b in ids {
                if a != b {
                    pairs.push((a.clone(), b.clone()));
                }
            }
        }
        pairs.shuffle(&mut rng);
        pairs.truncate(self.config.efficiency_sample_pairs);

        let mut lengths = Vec::new();
        for (a, b) in &pairs {
            let analysis = self.analyzer.analyze(a, b);
            if let Some(best) = analysis.best_path {
                lengths.push(best.hop_count() as f64);
            }
        }
        if lengths.is_empty() {
            0.0
        } else {
            let mean_len = lengths.iter().sum::<f64>() / lengths.len() as f64;
            1.0 / (1.0 + mean_len)
        }
    }

    /// Mean, over up to `resilience_sample_nodes` random single-node
    /// deletions, of the largest remaining component's fraction of
    /// `N - 1` (spec.md §4.3).
    fn sample_resilience(&self, ids: &[AgentId]) -> f64 {
        let n = ids.len();
        if n < 2 {
            return 0.0;
        }
        let mut rng = thread_rng();
        let mut sample = ids.to_vec();
        sample.shuffle(&mut rng);
        sample.truncate(self.config.resilience_sample_nodes);

        let full_adjacency = self.undirected_adjacency(ids);
        let mut scores = Vec::new();
        for removed in &sample {
            let mut adjacency = full_adjacency.clone();
            adjacency.remove(removed);
            for neighbors in adjacency.values_mut() {
                neighbors.remove(removed);
            }
            let remaining: Vec<AgentId> = ids.iter().filter(|id| *id != removed).cloned().collect();
            let largest = largest_component_size(&adjacency, &remaining);
            scores.push(largest as f64 / (n - 1) as f64);
        }
        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }

    fn undirected_adjacency(&self, ids: &[AgentId]) -> HashMap<AgentId, HashSet<AgentId>> {
        let mut adjacency: HashMap<AgentId, HashSet<AgentId>> = HashMap::new();
        for id in ids {
            for neighbor in self.store.get_neighbors(id) {
                adjacency.entry(id.clone()).or_default().insert(neighbor.clone());
                adjacency.entry(neighbor).or_default().insert(id.clone());
            }
        }
        adjacency
    }

    /// Ranks all known agents by a chosen metric, descending.
    pub fn rank_agents(&self, selector: impl Fn(&AgentMetrics) -> f64) -> Vec<(AgentId, f64)> {
        let mut ranked: Vec<(AgentId, f64)> = self
            .store
            .agent_ids()
            .iter()
            .filter_map(|id| self.agent_metrics(id, None).map(|m| (id.clone(), selector(&m))))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Synthetic time series for `agent` over `period_days`
    /// (spec.md §4.3, §9: fabricated because no history is retained).
    pub fn analyze_trust_trends(&self, agent: &AgentId, period_days: u32) -> Option<TrustTrend> {
        let current = self.agent_metrics(agent, None)?.average_trust_score;
        let now = crate::types::now();
        let mut points = Vec::new();
        let steps = period_days.max(1);
        for day in 0..steps {
            let synthetic = (current - 0.02 * (steps - day) as f64).clamp(-1.0, 1.0);
            points.push((now - chrono::Duration::days((steps - day) as i64), synthetic));
        }
        points.push((now, current));

        let slope = if points.len() >= 2 {
            let (t0, v0) = points.first().unwrap();
            let (t1, v1) = points.last().unwrap();
            let days = (*t1 - *t0).num_days().max(1) as f64;
            (v1 - v0) / days
        } else {
            0.0
        };
        let direction = if slope.abs() <= 0.01 {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        Some(TrustTrend {
            agent_id: agent.clone(),
            period_days,
            points,
            direction,
        })
    }
}

fn stdev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn local_clustering_coefficient(store: &TrustGraphStore, agent: &AgentId) -> f64 {
    let neighbors: HashSet<AgentId> = store.get_neighbors(agent).into_iter().collect();
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }
    let mut triangles = 0usize;
    let neighbor_list: Vec<&AgentId> = neighbors.iter().collect();
    for i in 0..neighbor_list.len() {
        for j in 0..neighbor_list.len() {
            if i == j {
                continue;
            }
            if store.get_edge(neighbor_list[i], neighbor_list[j]).is_some() {
                triangles += 1;
            }
        }
    }
    let possible = (k * (k - 1)) as f64;
    triangles as f64 / possible
}

fn bfs_reachability_fraction(
    store: &TrustGraphStore,
    agent: &AgentId,
    min_score: f64,
    total_agents: usize,
) -> f64 {
    if total_agents <= 1 {
        return 0.0;
    }
    let mut visited: HashSet<AgentId> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(agent.clone());
    queue.push_back(agent.clone());
    while let Some(current) = queue.pop_front() {
        for neighbor in store.get_neighbors(&current) {
            if visited.contains(&neighbor) {
                continue;
            }
            if let Some(edge) = store.get_edge(&current, &neighbor) {
                if edge.trust_score >= min_score {
                    visited.insert(neighbor.clone());
                    queue.push_back(neighbor);
                }
            }
        }
    }
    (visited.len() - 1) as f64 / (total_agents - 1) as f64
}

fn largest_component_size(adjacency: &HashMap<AgentId, HashSet<AgentId>>, nodes: &[AgentId]) -> usize {
    let mut visited: HashSet<AgentId> = HashSet::new();
    let mut largest = 0usize;
    for node in nodes {
        if visited.contains(node) {
            continue;
        }
        let mut size = 0usize;
        let mut queue = VecDeque::new();
        queue.push_back(node.clone());
        visited.insert(node.clone());
        while let Some(current) = queue.pop_front() {
            size += 1;
            if let Some(neighbors) = adjacency.get(&current) {
                for n in neighbors {
                    if visited.insert(n.clone()) {
                        queue.push_back(n.clone());
                    }
                }
            }
        }
        largest = largest.max(size);
    }
    largest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyzerConfig, StoreConfig};

    fn engine() -> (Arc<TrustGraphStore>, MetricsEngine) {
        let store = Arc::new(TrustGraphStore::new(StoreConfig::default()));
        store.update_trust("A".into(), "B".into(), 0.8, 0.9, None);
        store.update_trust("A".into(), "C".into(), 0.6, 0.7, None);
        store.update_trust("B".into(), "C".into(), 0.9, 0.8, None);
        store.update_trust("B".into(), "D".into(), 0.7, 0.6, None);
        store.update_trust("C".into(), "D".into(), 0.5, 0.5, None);
        let analyzer = Arc::new(PathAnalyzer::new(store.clone(), AnalyzerConfig::default()));
        let engine = MetricsEngine::new(store.clone(), analyzer, MetricsConfig::default());
        (store, engine)
    }

    #[test]
    fn agent_metrics_absent_for_unknown_agent() {
        let (_, engine) = engine();
        assert!(engine.agent_metrics(&"Z".into(), None).is_none());
    }

    #[test]
    fn average_trust_score_matches_incoming_mean() {
        let (_, engine) = engine();
        let m = engine.agent_metrics(&"C".into(), None).unwrap();
        assert!((m.average_trust_score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn network_metrics_reports_counts() {
        let (_, engine) = engine();
        let net = engine.network_metrics();
        assert_eq!(net.total_agents, 4);
        assert_eq!(net.total_edges, 5);
    }
}
