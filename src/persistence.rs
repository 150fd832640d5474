//! Snapshot save/load and export formats (spec.md §6).
//!
//! The JSON snapshot shape mirrors what `synapsed_promise`'s reputation
//! persistence does for its own `DashMap` state: plain `serde_json`
//! round-tripping through a wrapper struct, no schema migrations.

use crate::behavior::{AgentBehavior, BehaviorModel};
use crate::error::{Result, TrustGraphError};
use crate::graph::{AgentNode, TrustEdge, TrustGraphStore};
use crate::metrics::{AgentMetrics, NetworkMetrics};
use crate::types::now;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMetadata {
    saved_at: chrono::DateTime<chrono::Utc>,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    nodes: Vec<AgentNode>,
    edges: Vec<TrustEdge>,
    metadata: SnapshotMetadata,
}

/// Writes the store's current state to `path` as JSON (spec.md §6.1).
/// I/O failures are logged and surfaced; they never partially mutate the
/// store (the store is the source of the snapshot, not the sink).
pub fn save_to_file(store: &TrustGraphStore, path: &Path) -> Result<()> {
    let (nodes, edges) = store.snapshot();
    let snapshot = Snapshot {
        nodes,
        edges,
        metadata: SnapshotMetadata {
            saved_at: now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    if let Err(e) = fs::write(path, json) {
        error!(path = %path.display(), error = %e, "snapshot save failed");
        return Err(TrustGraphError::Io(e));
    }
    info!(path = %path.display(), nodes = snapshot.nodes.len(), edges = snapshot.edges.len(), "snapshot saved");
    Ok(())
}

/// Loads a snapshot from `path`, replacing the store's current contents.
/// A failed load never partially populates the store (spec.md §7 kind 4):
/// the store is only touched once the file has been fully parsed.
pub fn load_from_file(store: &TrustGraphStore, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "snapshot load failed");
        TrustGraphError::Io(e)
    })?;
    let snapshot: Snapshot = serde_json::from_str(&contents)?;
    store.load_snapshot(snapshot.nodes, snapshot.edges);
    info!(path = %path.display(), "snapshot loaded");
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct BehaviorSnapshot {
    agents: Vec<AgentBehavior>,
}

/// Writes the Behavior Model's agent records to `path` as
/// `behavior_model.json` (spec.md §6.1).
pub fn save_behavior_to_file(agents: Vec<AgentBehavior>, path: &Path) -> Result<()> {
    let snapshot = BehaviorSnapshot { agents };
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json).map_err(TrustGraphError::Io)?;
    Ok(())
}

/// Loads agent behavior records from `path` into `model` (spec.md §6.1).
pub fn load_behavior_from_file(model: &BehaviorModel, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path).map_err(TrustGraphError::Io)?;
    let snapshot: BehaviorSnapshot = serde_json::from_str(&contents)?;
    for agent in snapshot.agents {
        model.restore_agent(agent);
    }
    Ok(())
}

/// CSV export of edges: header `from_agent,to_agent,trust_score,confidence,
/// interaction_count,created_at,updated_at` (spec.md §6.2).
pub fn export_edges_csv(store: &TrustGraphStore) -> String {
    let mut out = String::from("from_agent,to_agent,trust_score,confidence,interaction_count,created_at,updated_at\n");
    for edge in store.all_edges() {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            edge.from_agent,
            edge.to_agent,
            edge.trust_score,
            edge.confidence,
            edge.interaction_count,
            edge.created_at.to_rfc3339(),
            edge.updated_at.to_rfc3339(),
        ));
    }
    out
}

/// DOT (Graphviz) export of the graph, colored green for `score > 0`, red
/// for `< 0`, gray for 0 (spec.md §6.2).
pub fn export_dot(store: &TrustGraphStore) -> String {
    let mut out = String::from("digraph trust_graph {\n");
    for id in store.agent_ids() {
        out.push_str(&format!("  \"{}\";\n", id));
    }
    for edge in store.all_edges() {
        let color = if edge.trust_score > 0.0 {
            "green"
        } else if edge.trust_score < 0.0 {
            "red"
        } else {
            "gray"
        };
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{:.2}\", color={}];\n",
            edge.from_agent, edge.to_agent, edge.trust_score, color
        ));
    }
    out.push_str("}\n");
    out
}

#[derive(Debug, Serialize)]
struct MetricsExport<'a> {
    network_metrics: &'a NetworkMetrics,
    agent_metrics: &'a [AgentMetrics],
    exported_at: chrono::DateTime<chrono::Utc>,
}

/// JSON export for metrics: top-level `{network_metrics, agent_metrics,
/// exported_at}` (spec.md §6.2).
pub fn export_metrics_json(network: &NetworkMetrics, agents: &[AgentMetrics]) -> Result<String> {
    let export = MetricsExport {
        network_metrics: network,
        agent_metrics: agents,
        exported_at: now(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tempfile::tempdir;

    fn seeded_store() -> TrustGraphStore {
        let store = TrustGraphStore::new(StoreConfig::default());
        store.update_trust("A".into(), "B".into(), 0.8, 0.9, None);
        store.update_trust("A".into(), "C".into(), 0.6, 0.7, None);
        store.update_trust("B".into(), "C".into(), 0.9, 0.8, None);
        store.update_trust("B".into(), "D".into(), 0.7, 0.6, None);
        store.update_trust("C".into(), "D".into(), 0.5, 0.5, None);
        store.update_trust("C".into(), "E".into(), 0.4, 0.4, None);
        store.update_trust("D".into(), "E".into(), 0.8, 0.7, None);
        store.update_trust("E".into(), "A".into(), 0.3, 0.3, None);
        store
    }

    #[test]
    fn round_trip_preserves_counts_and_scalars() {
        let store = seeded_store();
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        save_to_file(&store, &path).unwrap();

        let reloaded = TrustGraphStore::with_default_config();
        load_from_file(&reloaded, &path).unwrap();

        assert_eq!(reloaded.agent_count(), 5);
        assert_eq!(reloaded.edge_count(), 8);
        assert_eq!(
            reloaded.get_trust_score(&"A".into(), &"B".into()),
            store.get_trust_score(&"A".into(), &"B".into())
        );
    }

    #[test]
    fn load_missing_file_does_not_populate_store() {
        let store = TrustGraphStore::with_default_config();
        let result = load_from_file(&store, Path::new("/nonexistent/snapshot.json"));
        assert!(result.is_err());
        assert_eq!(store.agent_count(), 0);
    }

    #[test]
    fn csv_export_has_expected_header() {
        let store = seeded_store();
        let csv = export_edges_csv(&store);
        assert!(csv.starts_with("from_agent,to_agent,trust_score,confidence,interaction_count,created_at,updated_at\n"));
        assert_eq!(csv.lines().count(), 9);
    }

    #[test]
    fn dot_export_colors_by_sign() {
        let store = TrustGraphStore::with_default_config();
        store.update_trust("A".into(), "B".into(), 0.5, 0.5, None);
        store.update_trust("B".into(), "A".into(), -0.5, 0.5, None);
        let dot = export_dot(&store);
        assert!(dot.contains("color=green"));
        assert!(dot.contains("color=red"));
    }
}
