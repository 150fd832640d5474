//! Property-based checks of the merge algebra's universal invariants
//! (spec.md §8).

use proptest::prelude::*;
use trust_graph_core::graph::TrustGraphStore;
use trust_graph_core::config::StoreConfig;

proptest! {
    #[test]
    fn merged_edge_always_stays_in_range(
        scores in prop::collection::vec(-2.0f64..2.0, 1..20),
        confidences in prop::collection::vec(-1.0f64..2.0, 1..20),
    ) {
        let store = TrustGraphStore::new(StoreConfig::default());
        let n = scores.len().min(confidences.len());
        for i in 0..n {
            store.update_trust("A".into(), "B".into(), scores[i], confidences[i], None);
            let edge = store.get_edge(&"A".into(), &"B".into()).unwrap();
            prop_assert!(edge.trust_score >= -1.0 && edge.trust_score <= 1.0);
            prop_assert!(edge.confidence >= 0.0 && edge.confidence <= 1.0);
            prop_assert_eq!(edge.interaction_count, (i + 1) as u64);
        }
    }

    #[test]
    fn high_perf_assign_also_stays_in_range(
        scores in prop::collection::vec(-2.0f64..2.0, 1..20),
        confidences in prop::collection::vec(-1.0f64..2.0, 1..20),
    ) {
        let store = TrustGraphStore::new(StoreConfig { high_performance: true, ..StoreConfig::default() });
        let n = scores.len().min(confidences.len());
        for i in 0..n {
            store.update_trust("A".into(), "B".into(), scores[i], confidences[i], None);
            let edge = store.get_edge(&"A".into(), &"B".into()).unwrap();
            prop_assert!(edge.trust_score >= -1.0 && edge.trust_score <= 1.0);
            prop_assert!(edge.confidence >= 0.0 && edge.confidence <= 1.0);
        }
    }
}
