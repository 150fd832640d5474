//! Cross-component seed suite (spec.md §8).

use std::sync::Arc;
use tempfile::tempdir;
use trust_graph_core::analyzer::PathAnalyzer;
use trust_graph_core::behavior::{BehaviorModel, InteractionOutcome};
use trust_graph_core::config::{AnalyzerConfig, BehaviorConfig, MetricsConfig, StoreConfig};
use trust_graph_core::graph::TrustGraphStore;
use trust_graph_core::metrics::MetricsEngine;
use trust_graph_core::persistence;
use trust_graph_core::types::AgentId;

fn seed_store() -> Arc<TrustGraphStore> {
    let store = Arc::new(TrustGraphStore::new(StoreConfig::default()));
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
fn weighted_merge_scenario() {
    let store = TrustGraphStore::with_default_config();
    store.update_trust("A".into(), "B".into(), 0.8, 0.9, None);
    store.update_trust("A".into(), "B".into(), -0.3, 0.7, None);
    let edge = store.get_edge(&"A".into(), &"B".into()).unwrap();
    assert!((edge.trust_score - 0.25).abs() < 1e-9);
    assert_eq!(edge.interaction_count, 2);
}

#[test]
fn clamping_scenario() {
    let store = TrustGraphStore::with_default_config();
    store.update_trust("A".into(), "B".into(), 2.0, 1.0, None);
    assert_eq!(store.get_trust_score(&"A".into(), &"B".into()), Some(1.0));

    let store2 = TrustGraphStore::with_default_config();
    store2.update_trust("A".into(), "B".into(), -2.0, 1.0, None);
    assert_eq!(store2.get_trust_score(&"A".into(), &"B".into()), Some(-1.0));
}

#[test]
fn cycle_detection_scenario() {
    let store = seed_store();
    let cycles = store.detect_circular_references();
    assert!(!cycles.is_empty());
}

#[test]
fn best_path_search_scenario() {
    let store = seed_store();
    let analyzer = PathAnalyzer::new(store, AnalyzerConfig::default());
    let analysis = analyzer.analyze(&"A".into(), &"D".into());
    let best = analysis.best_path.expect("expected at least one path");
    assert_eq!(best.agents, vec![AgentId::from("A"), "C".into(), "D".into()]);
    assert!((best.composite_trust - 0.24).abs() < 1e-6);
}

#[test]
fn round_trip_scenario() {
    let store = seed_store();
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    persistence::save_to_file(&store, &path).unwrap();

    let reloaded = TrustGraphStore::with_default_config();
    persistence::load_from_file(&reloaded, &path).unwrap();

    assert_eq!(reloaded.agent_count(), 5);
    assert_eq!(reloaded.edge_count(), 8);
    for (from, to) in [("A", "B"), ("A", "C"), ("B", "C"), ("B", "D"), ("C", "D"), ("C", "E"), ("D", "E"), ("E", "A")] {
        let original = store.get_edge(&from.into(), &to.into()).unwrap();
        let copy = reloaded.get_edge(&from.into(), &to.into()).unwrap();
        assert_eq!(original.trust_score, copy.trust_score);
        assert_eq!(original.confidence, copy.confidence);
        assert_eq!(original.interaction_count, copy.interaction_count);
    }
}

#[test]
fn source_equals_target_yields_no_paths() {
    let store = seed_store();
    let analyzer = PathAnalyzer::new(store, AnalyzerConfig::default());
    let analysis = analyzer.analyze(&"A".into(), &"A".into());
    assert!(analysis.all_paths.is_empty());
}

#[test]
fn metrics_engine_reads_store_and_analyzer() {
    let store = seed_store();
    let analyzer = Arc::new(PathAnalyzer::new(store.clone(), AnalyzerConfig::default()));
    let engine = MetricsEngine::new(store, analyzer, MetricsConfig::default());
    let network = engine.network_metrics();
    assert_eq!(network.total_agents, 5);
    assert_eq!(network.total_edges, 8);
    assert!(network.average_trust_score > 0.0);
}

#[test]
fn behavior_model_feeds_agent_metrics() {
    let store = seed_store();
    let analyzer = Arc::new(PathAnalyzer::new(store.clone(), AnalyzerConfig::default()));
    let engine = MetricsEngine::new(store.clone(), analyzer, MetricsConfig::default());
    let behavior = BehaviorModel::new(BehaviorConfig::default());

    behavior.record_interaction(&"A".into(), InteractionOutcome::Success);
    behavior.record_interaction(&"A".into(), InteractionOutcome::Success);
    behavior.record_interaction(&"A".into(), InteractionOutcome::Failure);
    behavior.add_specialization(&"A".into(), "auditing");

    let metrics = engine.agent_metrics(&"A".into(), Some(&behavior)).unwrap();
    let behavioral = metrics.behavioral.expect("behavioral metrics expected");
    assert!((behavioral.success_rate - (2.0 / 3.0)).abs() < 1e-9);
    assert_eq!(behavioral.total_interactions, 3);
    assert_eq!(behavioral.specializations, vec!["auditing".to_string()]);
}
