//! The Trust Graph Store: directed graph of agents and trust edges,
//! weighted-average merge, decay, expiry, and cycle detection
//! (spec.md §4.1).

use super::edge::TrustEdge;
use super::node::AgentNode;
use crate::config::StoreConfig;
use crate::types::{now, AgentId, Metadata};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One update in a batch ingest call.
pub struct TrustUpdate {
    pub from: AgentId,
    pub to: AgentId,
    pub score: f64,
    pub confidence: f64,
    pub metadata: Metadata,
}

struct Inner {
    nodes: HashMap<AgentId, AgentNode>,
    edges: HashMap<(AgentId, AgentId), TrustEdge>,
}

/// The directed, weighted trust graph. All mutating and reading operations
/// take a single reentrant-in-spirit lock for their whole duration
/// (spec.md §5) — here a `parking_lot::RwLock`, readers concurrent with
/// each other and exclusive with writers, which the spec explicitly
/// allows as a conforming strengthening of the source's single mutex.
pub struct TrustGraphStore {
    config: StoreConfig,
    inner: RwLock<Inner>,
}

impl TrustGraphStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner {
                nodes: HashMap::new(),
                edges: HashMap::new(),
            }),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(StoreConfig::default())
    }

    /// Creates an agent if absent. Returns `true` if created, `false` if
    /// it already existed (spec.md §7 kind 3: duplicate-create, no error).
    pub fn add_agent(&self, id: AgentId, metadata: Option<Metadata>) -> bool {
        let mut inner = self.inner.write();
        if inner.nodes.contains_key(&id) {
            return false;
        }
        inner
            .nodes
            .insert(id.clone(), AgentNode::new(id, metadata.unwrap_or_default()));
        true
    }

    fn ensure_agent(inner: &mut Inner, id: &AgentId) {
        inner
            .nodes
            .entry(id.clone())
            .or_insert_with(|| AgentNode::new(id.clone(), Metadata::new()));
    }

    /// Removes an agent and all incident edges. Returns `true` if it
    /// existed.
    pub fn remove_agent(&self, id: &AgentId) -> bool {
        let mut inner = self.inner.write();
        if inner.nodes.remove(id).is_none() {
            return false;
        }
        inner
            .edges
            .retain(|(from, to), _| from != id && to != id);
        true
    }

    /// Updates (or creates) the trust edge `from -> to` with a new sample,
    /// auto-creating missing endpoints (spec.md §3.2 invariant 1).
    /// Self-loops are never manufactured (spec.md §3.1, §4.2). Out-of-range
    /// `score`/`confidence` are clamped silently (spec.md §7 kind 1).
    pub fn update_trust(
        &self,
        from: AgentId,
        to: AgentId,
        score: f64,
        confidence: f64,
        metadata: Option<Metadata>,
    ) -> bool {
        if from == to {
            warn!(agent = %from, "rejected self-loop update_trust");
            return false;
        }
        let metadata = metadata.unwrap_or_default();
        let mut inner = self.inner.write();
        Self::ensure_agent(&mut inner, &from);
        Self::ensure_agent(&mut inner, &to);

        let key = (from.clone(), to.clone());
        let high_perf = self.config.high_performance;
        match inner.edges.get_mut(&key) {
            Some(edge) => {
                if high_perf {
                    edge.assign(score, confidence, metadata);
                } else {
                    edge.merge(score, confidence, metadata);
                }
            }
            None => {
                let edge = TrustEdge::new(
                    from.clone(),
                    to.clone(),
                    score,
                    confidence,
                    self.config.default_ttl_hours,
                    metadata,
                );
                inner.edges.insert(key, edge);
            }
        }

        if !high_perf {
            if let Some(node) = inner.nodes.get_mut(&to) {
                node.record_outcome(score.max(-1.0).min(1.0));
            }
        } else if let Some(node) = inner.nodes.get_mut(&to) {
            node.total_interactions += 1;
            node.updated_at = now();
        }

        debug!(from = %from, to = %to, score, "update_trust applied");
        true
    }

    /// Applies a batch of updates under a single lock acquisition
    /// (spec.md §4.1, §5). Returns the count applied.
    pub fn update_trust_batch(&self, updates: Vec<TrustUpdate>, high_perf_override: Option<bool>) -> usize {
        let high_perf = high_perf_override.unwrap_or(self.config.high_performance);
        let mut inner = self.inner.write();
        let mut applied = 0usize;
        for u in updates {
            if u.from == u.to {
                if !high_perf {
                    warn!(agent = %u.from, "skipped self-loop in batch update");
                }
                continue;
            }
            Self::ensure_agent(&mut inner, &u.from);
            Self::ensure_agent(&mut inner, &u.to);
            let key = (u.from.clone(), u.to.clone());
            match inner.edges.get_mut(&key) {
                Some(edge) => {
                    if high_perf {
                        edge.assign(u.score, u.confidence, u.metadata);
                    } else {
                        edge.merge(u.score, u.confidence, u.metadata);
                    }
                }
                None => {
                    let edge = TrustEdge::new(
                        u.from.clone(),
                        u.to.clone(),
                        u.score,
                        u.confidence,
                        self.config.default_ttl_hours,
                        u.metadata,
                    );
                    inner.edges.insert(key, edge);
                }
            }
            if high_perf {
                if let Some(node) = inner.nodes.get_mut(&u.to) {
                    node.total_interactions += 1;
                    node.updated_at = now();
                }
            } else if let Some(node) = inner.nodes.get_mut(&u.to) {
                node.record_outcome(u.score.max(-1.0).min(1.0));
            }
            applied += 1;
        }
        info!(applied, high_perf, "update_trust_batch complete");
        applied
    }

    /// Returns the trust score for `(from, to)`, or `None` if the edge is
    /// absent or expired (spec.md §3.2 invariant 4).
    pub fn get_trust_score(&self, from: &AgentId, to: &AgentId) -> Option<f64> {
        self.get_edge(from, to).map(|e| e.trust_score)
    }

    /// Returns the edge `(from, to)`, or `None` if absent or expired.
    pub fn get_edge(&self, from: &AgentId, to: &AgentId) -> Option<TrustEdge> {
        let inner = self.inner.read();
        let edge = inner.edges.get(&(from.clone(), to.clone()))?;
        if edge.is_expired_at(now()) {
            return None;
        }
        Some(edge.clone())
    }

    /// Out-neighbors of `id` (every `to_agent` for which an edge exists,
    /// regardless of expiry — callers that care about expiry go through
    /// `get_edge`/`get_trust_score`, which already hide expired data).
    pub fn get_neighbors(&self, id: &AgentId) -> Vec<AgentId> {
        let inner = self.inner.read();
        inner
            .edges
            .keys()
            .filter(|(from, _)| from == id)
            .map(|(_, to)| to.clone())
            .collect()
    }

    pub fn get_node(&self, id: &AgentId) -> Option<AgentNode> {
        self.inner.read().nodes.get(id).cloned()
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.inner.read().nodes.keys().cloned().collect()
    }

    pub fn agent_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.len()
    }

    /// All non-expired edges, for metrics/export.
    pub fn all_edges(&self) -> Vec<TrustEdge> {
        let now = now();
        self.inner
            .read()
            .edges
            .values()
            .filter(|e| !e.is_expired_at(now))
            .cloned()
            .collect()
    }

    /// Applies time decay to every non-expired edge (spec.md §4.1).
    /// Expired edges are skipped (spec.md §9 Open Questions: decay on an
    /// already-expired edge is left unspecified upstream; this
    /// implementation chooses to skip them).
    pub fn apply_decay(&self) -> usize {
        let mut inner = self.inner.write();
        let decay_rate = self.config.decay_rate;
        let at = now();
        let mut decayed = 0usize;
        for edge in inner.edges.values_mut() {
            if edge.is_expired_at(at) {
                continue;
            }
            edge.apply_decay(decay_rate, at);
            decayed += 1;
        }
        info!(decayed, "apply_decay complete");
        decayed
    }

    /// Removes every expired edge from storage. Returns the count removed.
    pub fn cleanup_expired_edges(&self) -> usize {
        let mut inner = self.inner.write();
        let at = now();
        let before = inner.edges.len();
        inner.edges.retain(|_, e| !e.is_expired_at(at));
        let removed = before - inner.edges.len();
        info!(removed, "cleanup_expired_edges complete");
        removed
    }

    /// DFS white/gray/black cycle detection over the stored (possibly
    /// expired) edges (spec.md §4.1). Returns every distinct path that
    /// closes a cycle.
    pub fn detect_circular_references(&self) -> Vec<Vec<AgentId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let inner = self.inner.read();
        let mut adjacency: HashMap<AgentId, Vec<AgentId>> = HashMap::new();
        for (from, to) in inner.edges.keys() {
            adjacency.entry(from.clone()).or_default().push(to.clone());
        }
        let mut color: HashMap<AgentId, Color> =
            inner.nodes.keys().map(|id| (id.clone(), Color::White)).collect();
        let mut cycles = Vec::new();
        let mut path: Vec<AgentId> = Vec::new();

        fn visit(
            node: &AgentId,
            adjacency: &HashMap<AgentId, Vec<AgentId>>,
            color: &mut HashMap<AgentId, Color>,
            path: &mut Vec<AgentId>,
            cycles: &mut Vec<Vec<AgentId>>,
        ) {
            color.insert(node.clone(), Color::Gray);
            path.push(node.clone());
            if let Some(neighbors) = adjacency.get(node) {
                for next in neighbors {
                    match color.get(next) {
                        Some(Color::White) | None => {
                            visit(next, adjacency, color, path, cycles);
                        }
                        Some(Color::Gray) => {
                            if let Some(start) = path.iter().position(|n| n == next) {
                                cycles.push(path[start..].to_vec());
                            }
                        }
                        Some(Color::Black) => {}
                    }
                }
            }
            path.pop();
            color.insert(node.clone(), Color::Black);
        }

        let ids: Vec<AgentId> = inner.nodes.keys().cloned().collect();
        for id in &ids {
            if color.get(id) == Some(&Color::White) {
                visit(id, &adjacency, &mut color, &mut path, &mut cycles);
            }
        }
        cycles
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn snapshot(&self) -> (Vec<AgentNode>, Vec<TrustEdge>) {
        let inner = self.inner.read();
        (
            inner.nodes.values().cloned().collect(),
            inner.edges.values().cloned().collect(),
        )
    }

    pub(crate) fn load_snapshot(&self, nodes: Vec<AgentNode>, edges: Vec<TrustEdge>) {
        let mut inner = self.inner.write();
        inner.nodes.clear();
        inner.edges.clear();
        for n in nodes {
            inner.nodes.insert(n.agent_id.clone(), n);
        }
        for e in edges {
            inner
                .edges
                .insert((e.from_agent.clone(), e.to_agent.clone()), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TrustGraphStore {
        TrustGraphStore::with_default_config()
    }

    #[test]
    fn add_agent_then_duplicate() {
        let s = store();
        assert!(s.add_agent("A".into(), None));
        assert!(!s.add_agent("A".into(), None));
    }

    #[test]
    fn update_trust_autocreates_endpoints() {
        let s = store();
        assert!(s.update_trust("A".into(), "B".into(), 0.5, 0.5, None));
        assert_eq!(s.agent_count(), 2);
        assert_eq!(s.edge_count(), 1);
    }

    #[test]
    fn self_loop_rejected() {
        let s = store();
        assert!(!s.update_trust("A".into(), "A".into(), 0.5, 0.5, None));
        assert_eq!(s.edge_count(), 0);
    }

    #[test]
    fn clamping_on_fresh_edge() {
        let s = store();
        s.update_trust("A".into(), "B".into(), 2.0, 1.0, None);
        assert_eq!(s.get_trust_score(&"A".into(), &"B".into()), Some(1.0));
    }

    #[test]
    fn expiry_hides_reads_but_keeps_data() {
        let s = TrustGraphStore::new(StoreConfig {
            default_ttl_hours: 0.0,
            ..StoreConfig::default()
        });
        s.update_trust("A".into(), "B".into(), 0.5, 0.5, None);
        // advance logical time by mutating updated_at directly via reload
        let (nodes, mut edges) = s.snapshot();
        edges[0].updated_at = edges[0].updated_at - chrono::Duration::hours(1);
        s.load_snapshot(nodes, edges);

        assert_eq!(s.get_trust_score(&"A".into(), &"B".into()), None);
        assert_eq!(s.edge_count(), 1);
        assert_eq!(s.cleanup_expired_edges(), 1);
        assert_eq!(s.edge_count(), 0);
    }

    #[test]
    fn cycle_detection_finds_triangle() {
        let s = store();
        s.update_trust("A".into(), "B".into(), 0.5, 0.5, None);
        s.update_trust("B".into(), "C".into(), 0.5, 0.5, None);
        s.update_trust("C".into(), "A".into(), 0.5, 0.5, None);
        let cycles = s.detect_circular_references();
        assert!(!cycles.is_empty());
        let found = &cycles[0];
        for id in ["A", "B", "C"] {
            assert!(found.iter().any(|a| a.as_str() == id));
        }
    }

    #[test]
    fn node_counters_match_outcome_kind() {
        let s = store();
        s.update_trust("A".into(), "B".into(), 0.5, 0.5, None);
        s.update_trust("A".into(), "B".into(), -0.5, 0.5, None);
        s.update_trust("A".into(), "B".into(), 0.0, 0.5, None);
        let node = s.get_node(&"B".into()).unwrap();
        assert_eq!(node.total_interactions, 3);
        assert_eq!(node.successful_interactions, 1);
        assert_eq!(node.failed_interactions, 1);
        assert_eq!(node.zero_score_updates, 1);
    }
}
