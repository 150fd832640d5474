//! Throughput budgets from spec.md §5/§8: normal-mode updates, high-perf
//! batch updates, and network metrics on a larger graph.

use criterion::{criterion_group, criterion_main, Criterion};
use rand::Rng;
use std::sync::Arc;
use trust_graph_core::analyzer::PathAnalyzer;
use trust_graph_core::config::{AnalyzerConfig, MetricsConfig, StoreConfig};
use trust_graph_core::graph::{TrustGraphStore, TrustUpdate};
use trust_graph_core::metrics::MetricsEngine;
use trust_graph_core::types::AgentId;

fn agent_ids(n: usize) -> Vec<AgentId> {
    (0..n).map(|i| AgentId::from(format!("agent-{i}"))).collect()
}

fn bench_normal_mode_updates(c: &mut Criterion) {
    let agents = agent_ids(50);
    c.bench_function("normal_mode_500_updates_50_agents", |b| {
        b.iter(|| {
            let store = TrustGraphStore::with_default_config();
            let mut rng = rand::thread_rng();
            for _ in 0..500 {
                let from = &agents[rng.gen_range(0..agents.len())];
                let to = &agents[rng.gen_range(0..agents.len())];
                if from == to {
                    continue;
                }
                store.update_trust(from.clone(), to.clone(), rng.gen_range(-1.0..1.0), rng.gen_range(0.0..1.0), None);
            }
        });
    });
}

fn bench_high_perf_batch_updates(c: &mut Criterion) {
    let agents = agent_ids(100);
    c.bench_function("high_perf_1000_updates_batch_50", |b| {
        b.iter(|| {
            let store = TrustGraphStore::new(StoreConfig {
                high_performance: true,
                ..StoreConfig::default()
            });
            let mut rng = rand::thread_rng();
            for _ in 0..20 {
                let batch: Vec<TrustUpdate> = (0..50)
                    .filter_map(|_| {
                        let from = agents[rng.gen_range(0..agents.len())].clone();
                        let to = agents[rng.gen_range(0..agents.len())].clone();
                        if from == to {
                            return None;
                        }
                        Some(TrustUpdate {
                            from,
                            to,
                            score: rng.gen_range(-1.0..1.0),
                            confidence: rng.gen_range(0.0..1.0),
                            metadata: Default::default(),
                        })
                    })
                    .collect();
                store.update_trust_batch(batch, Some(true));
            }
        });
    });
}

fn bench_network_metrics_150_agent_chain(c: &mut Criterion) {
    let store = Arc::new(TrustGraphStore::with_default_config());
    let agents = agent_ids(150);
    for pair in agents.windows(2) {
        store.update_trust(pair[0].clone(), pair[1].clone(), 0.6, 0.7, None);
    }
    let analyzer = Arc::new(PathAnalyzer::new(store.clone(), AnalyzerConfig::default()));
    let engine = MetricsEngine::new(store, analyzer, MetricsConfig::default());

    c.bench_function("network_metrics_150_agent_chain", |b| {
        b.iter(|| {
            engine.clear_cache();
            engine.network_metrics()
        });
    });
}

criterion_group!(
    benches,
    bench_normal_mode_updates,
    bench_high_perf_batch_updates,
    bench_network_metrics_150_agent_chain
);
criterion_main!(benches);
