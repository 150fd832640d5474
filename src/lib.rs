//! A multi-agent trust graph: weighted trust edges, indirect-trust path
//! search, network analytics, and per-agent behavioral modeling.
//!
//! The four subsystems compose in one direction only: the Behavior Model
//! is self-contained, the Trust Graph Store is self-contained, the Path
//! Analyzer reads the Store, and the Metrics Engine reads the Store, the
//! Analyzer, and optionally the Behavior Model.

pub mod analyzer;
pub mod behavior;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod persistence;
pub mod types;

pub use analyzer::{PathAnalysis, PathAnalyzer, TrustLevel, TrustPath, TrustworthinessAssessment};
pub use behavior::{BehaviorModel, BehaviorPrediction, InteractionOutcome};
pub use config::{AnalyzerConfig, BehaviorConfig, MetricsConfig, StoreConfig};
pub use error::{Result, TrustGraphError};
pub use graph::{AgentNode, TrustEdge, TrustGraphStore, TrustUpdate};
pub use metrics::{AgentMetrics, MetricsEngine, NetworkMetrics, TrustTrend};
pub use types::AgentId;
