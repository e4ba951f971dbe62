//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use axum::extract::State;

use hostdash_core::Orchestrator;

/// The orchestrator is internally synchronized, so handlers share it directly.
pub(crate) type SharedOrchestrator = Arc<Orchestrator>;

pub(crate) type AppState = State<SharedOrchestrator>;
