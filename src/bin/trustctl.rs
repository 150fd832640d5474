//! Command-line front end for the trust graph core (spec.md §6.3).
//!
//! Manual `std::env::args()` parsing, no argument-parsing crate: this
//! crate's CLI surface is small and stable enough that a hand-rolled
//! dispatcher is clearer than the machinery a growing CLI would need.
//! Logs go to stderr via `tracing`; machine-readable results go to
//! stdout as JSON via `serde_json`. Exit codes: 0 success, 1 usage
//! error, 2 runtime error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use trust_graph_core::analyzer::PathAnalyzer;
use trust_graph_core::behavior::BehaviorModel;
use trust_graph_core::config::{AnalyzerConfig, BehaviorConfig, MetricsConfig, StoreConfig};
use trust_graph_core::graph::TrustGraphStore;
use trust_graph_core::metrics::MetricsEngine;
use trust_graph_core::persistence;
use trust_graph_core::types::AgentId;

const USAGE: &str = "\
usage: trustctl [--storage <dir>] <group> <command> [args...]

groups:
  store    add <id> | update <from> <to> <score> <confidence> | get <from> <to>
           | stats | export <csv|dot> | decay | cleanup
  analyze  analyze <source> <target> | assess <source> <target> | clusters | stats
  metrics  agent <id> | network | trend <id> <period_days> | ranking <metric> | export
";

struct Context {
    storage: PathBuf,
}

impl Context {
    fn snapshot_path(&self) -> PathBuf {
        self.storage.join("snapshot.json")
    }
    fn behavior_path(&self) -> PathBuf {
        self.storage.join("behavior_model.json")
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => code,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}\n\n{USAGE}");
            ExitCode::from(1)
        }
        Err(CliError::Runtime(msg)) => {
            tracing::error!("{msg}");
            ExitCode::from(2)
        }
    }
}

enum CliError {
    Usage(String),
    Runtime(String),
}

impl From<trust_graph_core::TrustGraphError> for CliError {
    fn from(e: trust_graph_core::TrustGraphError) -> Self {
        CliError::Runtime(e.to_string())
    }
}

fn run(mut args: Vec<String>) -> Result<ExitCode, CliError> {
    let storage = take_storage_flag(&mut args)?;
    let ctx = Context { storage };

    if args.is_empty() {
        return Err(CliError::Usage("missing <group>".to_string()));
    }
    let group = args.remove(0);

    let store = Arc::new(TrustGraphStore::with_default_config());
    if ctx.snapshot_path().exists() {
        persistence::load_from_file(&store, &ctx.snapshot_path())?;
    }
    let behavior = BehaviorModel::new(BehaviorConfig::default());
    if ctx.behavior_path().exists() {
        persistence::load_behavior_from_file(&behavior, &ctx.behavior_path())?;
    }
    let analyzer = Arc::new(PathAnalyzer::new(store.clone(), AnalyzerConfig::default()));
    let metrics = MetricsEngine::new(store.clone(), analyzer.clone(), MetricsConfig::default());

    match group.as_str() {
        "store" => run_store(&ctx, &store, args),
        "analyze" => run_analyze(&analyzer, args),
        "metrics" => run_metrics(&metrics, &behavior, args),
        other => Err(CliError::Usage(format!("unknown group '{other}'"))),
    }
}

fn take_storage_flag(args: &mut Vec<String>) -> Result<PathBuf, CliError> {
    if let Some(pos) = args.iter().position(|a| a == "--storage") {
        if pos + 1 >= args.len() {
            return Err(CliError::Usage("--storage requires a directory argument".to_string()));
        }
        let dir = PathBuf::from(args.remove(pos + 1));
        args.remove(pos);
        std::fs::create_dir_all(&dir).map_err(|e| CliError::Runtime(e.to_string()))?;
        Ok(dir)
    } else {
        Ok(PathBuf::from("."))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn parse_f64(s: &str, what: &str) -> Result<f64, CliError> {
    s.parse::<f64>()
        .map_err(|_| CliError::Usage(format!("'{s}' is not a valid {what}")))
}

fn run_store(ctx: &Context, store: &Arc<TrustGraphStore>, mut args: Vec<String>) -> Result<ExitCode, CliError> {
    if args.is_empty() {
        return Err(CliError::Usage("missing store command".to_string()));
    }
    let command = args.remove(0);
    let mut mutated = false;

    match command.as_str() {
        "add" => {
            let id = args.get(0).ok_or_else(|| CliError::Usage("add requires <id>".to_string()))?;
            let created = store.add_agent(AgentId::from(id.as_str()), None);
            print_json(&serde_json::json!({ "created": created }))?;
            mutated = true;
        }
        "update" => {
            if args.len() < 4 {
                return Err(CliError::Usage("update requires <from> <to> <score> <confidence>".to_string()));
            }
            let from = AgentId::from(args[0].as_str());
            let to = AgentId::from(args[1].as_str());
            let score = parse_f64(&args[2], "score")?;
            let confidence = parse_f64(&args[3], "confidence")?;
            let applied = store.update_trust(from, to, score, confidence, None);
            print_json(&serde_json::json!({ "applied": applied }))?;
            mutated = true;
        }
        "get" => {
            if args.len() < 2 {
                return Err(CliError::Usage("get requires <from> <to>".to_string()));
            }
            let from = AgentId::from(args[0].as_str());
            let to = AgentId::from(args[1].as_str());
            print_json(&store.get_edge(&from, &to))?;
        }
        "stats" => {
            print_json(&serde_json::json!({
                "agent_count": store.agent_count(),
                "edge_count": store.edge_count(),
            }))?;
        }
        "export" => {
            let format = args.get(0).map(String::as_str).unwrap_or("");
            match format {
                "csv" => print!("{}", persistence::export_edges_csv(store)),
                "dot" => print!("{}", persistence::export_dot(store)),
                other => return Err(CliError::Usage(format!("unsupported export format '{other}'"))),
            }
        }
        "decay" => {
            let decayed = store.apply_decay();
            print_json(&serde_json::json!({ "decayed": decayed }))?;
            mutated = true;
        }
        "cleanup" => {
            let removed = store.cleanup_expired_edges();
            print_json(&serde_json::json!({ "removed": removed }))?;
            mutated = true;
        }
        other => return Err(CliError::Usage(format!("unknown store command '{other}'"))),
    }

    if mutated {
        persistence::save_to_file(store, &ctx.snapshot_path())?;
    }
    Ok(ExitCode::from(0))
}

fn run_analyze(analyzer: &Arc<PathAnalyzer>, mut args: Vec<String>) -> Result<ExitCode, CliError> {
    if args.is_empty() {
        return Err(CliError::Usage("missing analyze command".to_string()));
    }
    let command = args.remove(0);
    match command.as_str() {
        "analyze" => {
            if args.len() < 2 {
                return Err(CliError::Usage("analyze requires <source> <target>".to_string()));
            }
            let analysis = analyzer.analyze(&AgentId::from(args[0].as_str()), &AgentId::from(args[1].as_str()));
            print_json(&analysis)?;
        }
        "assess" => {
            if args.len() < 2 {
                return Err(CliError::Usage("assess requires <source> <target>".to_string()));
            }
            let assessment =
                analyzer.assess_trustworthiness(&AgentId::from(args[0].as_str()), &AgentId::from(args[1].as_str()));
            print_json(&assessment)?;
        }
        "clusters" => print_json(&analyzer.find_trust_clusters())?,
        "stats" => print_json(&serde_json::json!({
            "cache_ttl_secs": analyzer.config().cache_ttl_secs,
            "max_path_length": analyzer.config().max_path_length,
        }))?,
        other => return Err(CliError::Usage(format!("unknown analyze command '{other}'"))),
    }
    Ok(ExitCode::from(0))
}

fn run_metrics(metrics: &MetricsEngine, behavior: &BehaviorModel, mut args: Vec<String>) -> Result<ExitCode, CliError> {
    if args.is_empty() {
        return Err(CliError::Usage("missing metrics command".to_string()));
    }
    let command = args.remove(0);
    match command.as_str() {
        "agent" => {
            let id = args.get(0).ok_or_else(|| CliError::Usage("agent requires <id>".to_string()))?;
            let agent_id = AgentId::from(id.as_str());
            print_json(&metrics.agent_metrics(&agent_id, Some(behavior)))?;
        }
        "network" => print_json(&metrics.network_metrics())?,
        "trend" => {
            if args.len() < 2 {
                return Err(CliError::Usage("trend requires <id> <period_days>".to_string()));
            }
            let agent_id = AgentId::from(args[0].as_str());
            let period: u32 = args[1]
                .parse()
                .map_err(|_| CliError::Usage(format!("'{}' is not a valid period", args[1])))?;
            print_json(&metrics.analyze_trust_trends(&agent_id, period))?;
        }
        "ranking" => {
            let metric = args.get(0).ok_or_else(|| CliError::Usage("ranking requires <metric>".to_string()))?;
            let ranked = rank_by_name(metrics, metric)?;
            print_json(&ranked)?;
        }
        "export" => {
            let network = metrics.network_metrics();
            let agent_metrics: Vec<_> = metrics
                .rank_agents(|m| m.average_trust_score)
                .into_iter()
                .filter_map(|(id, _)| metrics.agent_metrics(&id, None))
                .collect();
            let json = persistence::export_metrics_json(&network, &agent_metrics)?;
            println!("{json}");
        }
        other => return Err(CliError::Usage(format!("unknown metrics command '{other}'"))),
    }
    Ok(ExitCode::from(0))
}

fn rank_by_name(metrics: &MetricsEngine, metric: &str) -> Result<Vec<(AgentId, f64)>, CliError> {
    let ranked = match metric {
        "average_trust_score" => metrics.rank_agents(|m| m.average_trust_score),
        "trust_centrality" => metrics.rank_agents(|m| m.trust_centrality),
        "trust_influence" => metrics.rank_agents(|m| m.trust_influence),
        "trust_reliability" => metrics.rank_agents(|m| m.trust_reliability),
        "risk_score" => metrics.rank_agents(|m| m.risk_score),
        other => return Err(CliError::Usage(format!("unknown ranking metric '{other}'"))),
    };
    Ok(ranked)
}
