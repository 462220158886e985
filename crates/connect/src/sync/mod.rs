//! Sync module - batch fetching, proxy fallback and the raw call console.

mod console;
mod orchestrator;
mod progress;


pub use console::{parse_param, ConsoleRequest, RawCallConsole};
pub use orchestrator::{
    failure_message, FallbackPolicy, SkipReason, SyncConfig, SyncOrchestrator, SyncOutcome,
};
pub use progress::{NoOpProgressReporter, SyncProgressReporter, SyncStatus};
