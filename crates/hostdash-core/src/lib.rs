//! hostdash-core - collection and history engine for the hostdash dashboard.
//!
//! Provides:
//! - `collector`: the six domain collectors, their time-gated cache wrapper,
//!   fallback chains, and the filesystem/command seams they read through
//! - `history`: bounded in-memory store of snapshots with dotted-path lookup
//! - `orchestrator`: owns every collector plus the history store
//! - `model`: serializable result types and the `Snapshot` map
//! - `config`: the explicit configuration passed into everything above
//! - `fmt`: shared formatting helpers (bytes, uptime, timestamps)
//! - `util`: lenient JSON parsing and regex extraction
//!
//! With `api` feature:
//! - OpenAPI schemas (`utoipa::ToSchema`) on the public result types

pub mod collector;
pub mod config;
pub mod fmt;
pub mod history;
pub mod model;
pub mod orchestrator;
pub mod util;

pub use config::DashConfig;
pub use history::MetricsHistory;
pub use model::Snapshot;
pub use orchestrator::Orchestrator;

/// Crate version reported by the system collector and the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
