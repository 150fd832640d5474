//! Crate-wide error type.
//!
//! Mirrors the teacher lineage's `PromiseError`/`SynapsedError` pattern: a
//! flat `thiserror` enum plus a `Result<T>` alias. Per spec.md §7, the
//! majority of "error modes" the spec describes (out-of-range input,
//! unknown-entity reads, duplicate-create) are NOT represented here at
//! all — they are encoded as ordinary return values (clamped numbers,
//! `Option`, `bool`) and never surface as `Err`.

use thiserror::Error;

/// Result type for trust graph core operations.
pub type Result<T> = std::result::Result<T, TrustGraphError>;

#[derive(Debug, Error)]
pub enum TrustGraphError {
    /// Snapshot load/save I/O failure (spec.md §7 kind 4).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed snapshot or export payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Export requested with an identifier the exporter doesn't know
    /// (spec.md §7 kind 5, a usage error).
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// An empty agent id was supplied at a public API boundary.
    #[error("invalid agent id: {0}")]
    InvalidAgentId(String),
}
