//! Path Analyzer: bounded-depth best-first search over the graph, yielding
//! ranked indirect-trust paths, trustworthiness assessment, and trust
//! clusters (spec.md §4.2).

use crate::cache::TtlCache;
use crate::config::AnalyzerConfig;
use crate::graph::TrustGraphStore;
use crate::types::AgentId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// A single ranked indirect-trust path from source to target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrustPath {
    pub agents: Vec<AgentId>,
    pub composite_trust: f64,
    pub confidence_product: f64,
}

impl TrustPath {
    pub fn hop_count(&self) -> usize {
        self.agents.len().saturating_sub(1)
    }
}

/// The result of analyzing `(source, target)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathAnalysis {
    pub source: AgentId,
    pub target: AgentId,
    pub all_paths: Vec<TrustPath>,
    pub best_path: Option<TrustPath>,
}

/// Qualitative trust bucket (spec.md §4.2 trustworthiness table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

/// Combined direct/indirect trustworthiness assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustworthinessAssessment {
    pub direct_trust: Option<f64>,
    pub indirect_trust: Option<f64>,
    pub overall: f64,
    pub level: TrustLevel,
    pub recommendation: &'static str,
}

fn bucket(overall: f64) -> (TrustLevel, &'static str) {
    if overall >= 0.8 {
        (TrustLevel::High, "trust")
    } else if overall >= 0.6 {
        (TrustLevel::Medium, "trust-with-caution")
    } else if overall >= 0.4 {
        (TrustLevel::Low, "verify")
    } else {
        (TrustLevel::VeryLow, "distrust")
    }
}

/// A connected component of size >= 2 induced by edges with score >=
/// `min_trust`, treated undirectedly (spec.md §4.2).
pub type TrustCluster = Vec<AgentId>;

struct FrontierState {
    trust_key: f64,
    hops: usize,
    node: AgentId,
    path: Vec<AgentId>,
    confidence_product: f64,
}

impl PartialEq for FrontierState {
    fn eq(&self, other: &Self) -> bool {
        self.trust_key == other.trust_key
    }
}
impl Eq for FrontierState {}
impl PartialOrd for FrontierState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FrontierState {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; the spec's Python min-heap negates the
        // key to get max-first behavior, we just compare the key directly.
        self.trust_key
            .partial_cmp(&other.trust_key)
            .unwrap_or(Ordering::Equal)
    }
}

/// Best-first search over the Trust Graph Store, ranked-path assessment,
/// and cluster discovery (spec.md §4.2).
pub struct PathAnalyzer {
    config: AnalyzerConfig,
    store: Arc<TrustGraphStore>,
    cache: TtlCache<(AgentId, AgentId), PathAnalysis>,
}

impl PathAnalyzer {
    pub fn new(store: Arc<TrustGraphStore>, config: AnalyzerConfig) -> Self {
        let cache = TtlCache::new(config.cache_ttl_secs);
        Self {
            config,
            store,
            cache,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Ranked acyclic trust paths of length <= `max_path_length` from
    /// `source` to `target` (spec.md §4.2). `source == target` and
    /// unknown endpoints yield an empty, non-error result.
    pub fn analyze(&self, source: &AgentId, target: &AgentId) -> PathAnalysis {
        if source == target {
            return PathAnalysis {
                source: source.clone(),
                target: target.clone(),
                all_paths: Vec::new(),
                best_path: None,
            };
        }
        if let Some(cached) = self.cache.get(&(source.clone(), target.clone())) {
            return cached;
        }

        let mut heap = BinaryHeap::new();
        heap.push(FrontierState {
            trust_key: 0.0,
            hops: 0,
            node: source.clone(),
            path: vec![source.clone()],
            confidence_product: 1.0,
        });

        let mut visited: HashSet<(AgentId, Vec<AgentId>)> = HashSet::new();
        let mut results: Vec<TrustPath> = Vec::new();

        while let Some(state) = heap.pop() {
            if results.len() >= self.config.max_paths {
                break;
            }
            if state.hops >= self.config.max_path_length || state.confidence_product < self.config.min_confidence {
                continue;
            }
            let visit_key = (state.node.clone(), state.path.clone());
            if !visited.insert(visit_key) {
                continue;
            }

            if &state.node == target && state.path.len() > 1 {
                let composite = path_trust(&self.store, &state.path, self.config.decay_factor);
                results.push(TrustPath {
                    agents: state.path.clone(),
                    composite_trust: composite,
                    confidence_product: state.confidence_product,
                });
                continue;
            }

            for next in self.store.get_neighbors(&state.node) {
                if state.path.contains(&next) {
                    continue;
                }
                let edge = match self.store.get_edge(&state.node, &next) {
                    Some(e) => e,
                    None => continue,
                };
                if edge.trust_score <= 0.0 {
                    continue;
                }
                let mut next_path = state.path.clone();
                next_path.push(next.clone());
                heap.push(FrontierState {
                    trust_key: edge.trust_score * self.config.decay_factor.powi(state.hops as i32),
                    hops: state.hops + 1,
                    node: next,
                    path: next_path,
                    confidence_product: state.confidence_product * edge.confidence,
                });
            }
        }

        results.sort_by(|a, b| {
            b.composite_trust
                .partial_cmp(&a.composite_trust)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.hop_count().cmp(&b.hop_count()))
                .then_with(|| {
                    b.confidence_product
                        .partial_cmp(&a.confidence_product)
                        .unwrap_or(Ordering::Equal)
                })
        });
        let best_path = results.first().cloned();

        let analysis = PathAnalysis {
            source: source.clone(),
            target: target.clone(),
            all_paths: results,
            best_path,
        };
        self.cache.insert((source.clone(), target.clone()), analysis.clone());
        debug!(%source, %target, paths = analysis.all_paths.len(), "path analysis complete");
        analysis
    }

    /// Combines direct trust with the best indirect path's composite trust
    /// (spec.md §4.2).
    pub fn assess_trustworthiness(&self, source: &AgentId, target: &AgentId) -> TrustworthinessAssessment {
        let direct_trust = self.store.get_trust_score(source, target);
        let indirect_trust = if source == target {
            None
        } else {
            self.analyze(source, target).best_path.map(|p| p.composite_trust)
        };
        let overall = match (direct_trust, indirect_trust) {
            (Some(d), Some(i)) => (d + i) / 2.0,
            (Some(d), None) => d,
            (None, Some(i)) => i,
            (None, None) => 0.0,
        };
        let (level, recommendation) = bucket(overall);
        TrustworthinessAssessment {
            direct_trust,
            indirect_trust,
            overall,
            level,
            recommendation,
        }
    }

    /// Connected components of size >= 2 induced by edges with
    /// `score >= min_trust`, treated undirectedly (spec.md §4.2).
    pub fn find_trust_clusters(&self) -> Vec<TrustCluster> {
        let ids = self.store.agent_ids();
        let mut undirected: std::collections::HashMap<AgentId, HashSet<AgentId>> =
            std::collections::HashMap::new();
        for id in &ids {
            for neighbor in self.store.get_neighbors(id) {
                if let Some(edge) = self.store.get_edge(id, &neighbor) {
                    if edge.trust_score >= self.config.min_trust {
                        undirected.entry(id.clone()).or_default().insert(neighbor.clone());
                        undirected.entry(neighbor).or_default().insert(id.clone());
                    }
                }
            }
        }

        let mut visited: HashSet<AgentId> = HashSet::new();
        let mut clusters = Vec::new();
        for id in &ids {
            if visited.contains(id) {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(id.clone());
            visited.insert(id.clone());
            while let Some(node) = queue.pop_front() {
                component.push(node.clone());
                if let Some(neighbors) = undirected.get(&node) {
                    for n in neighbors {
                        if visited.insert(n.clone()) {
                            queue.push_back(n.clone());
                        }
                    }
                }
            }
            if component.len() >= 2 {
                clusters.push(component);
            }
        }
        clusters
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

/// `T(path) = Π_{i=0..k-1} score(a_i, a_i+1) * decay_factor^i`, 0 if any
/// edge on the path is missing (spec.md §4.2).
fn path_trust(store: &TrustGraphStore, path: &[AgentId], decay_factor: f64) -> f64 {
    let mut composite = 1.0;
    for (i, pair) in path.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        match store.get_trust_score(a, b) {
            Some(score) => composite *= score * decay_factor.powi(i as i32),
            None => return 0.0,
        }
    }
    composite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn seeded_store() -> Arc<TrustGraphStore> {
        let store = Arc::new(TrustGraphStore::new(StoreConfig::default()));
        store.update_trust("A".into(), "B".into(), 0.8, 0.9, None);
        store.update_trust("B".into(), "C".into(), 0.9, 0.8, None);
        store.update_trust("A".into(), "C".into(), 0.6, 0.7, None);
        store.update_trust("C".into(), "D".into(), 0.5, 0.5, None);
        store
    }

    #[test]
    fn direct_shorter_path_ranks_first() {
        let store = seeded_store();
        let analyzer = PathAnalyzer::new(store, AnalyzerConfig::default());
        let analysis = analyzer.analyze(&"A".into(), &"D".into());
        assert!(!analysis.all_paths.is_empty());
        let best = analysis.best_path.unwrap();
        assert_eq!(best.agents, vec![AgentId::from("A"), "C".into(), "D".into()]);
    }

    #[test]
    fn source_equals_target_is_empty() {
        let store = seeded_store();
        let analyzer = PathAnalyzer::new(store, AnalyzerConfig::default());
        let analysis = analyzer.analyze(&"A".into(), &"A".into());
        assert!(analysis.all_paths.is_empty());
        assert!(analysis.best_path.is_none());
    }

    #[test]
    fn unknown_endpoint_yields_empty_not_error() {
        let store = seeded_store();
        let analyzer = PathAnalyzer::new(store, AnalyzerConfig::default());
        let analysis = analyzer.analyze(&"A".into(), &"Z".into());
        assert!(analysis.all_paths.is_empty());
    }

    #[test]
    fn clusters_require_at_least_two_members() {
        let store = seeded_store();
        let analyzer = PathAnalyzer::new(store, AnalyzerConfig {
            min_trust: 0.5,
            ..AnalyzerConfig::default()
        });
        let clusters = analyzer.find_trust_clusters();
        assert!(clusters.iter().any(|c| c.len() >= 2));
    }
}
