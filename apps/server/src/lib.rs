pub mod api;
pub mod config;
pub mod error;
mod main_lib;

pub use main_lib::{
    build_state, init_tracing, spawn_sync, start_initial_sync, AppState, ServerSyncOrchestrator,
    TracingProgressReporter,
};
