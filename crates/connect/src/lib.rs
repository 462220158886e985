//! Omie Connect - Talking to the Omie ERP API.
//!
//! This crate holds the service catalog, the gateway that performs and
//! classifies single calls, and the orchestrator that runs a dashboard sync
//! with its one-shot proxy fallback.

pub mod catalog;
pub mod gateway;
pub mod sync;

// Re-export commonly used types
pub use catalog::{DateRange, OmieRequest, OmieService, DEFAULT_API_BASE_URL};
pub use gateway::{ApiResponse, ErrorReferer, GatewayError, OmieApiClient, OmieGateway};
pub use sync::{
    ConsoleRequest, FallbackPolicy, NoOpProgressReporter, RawCallConsole, SkipReason, SyncConfig,
    SyncOrchestrator, SyncOutcome, SyncProgressReporter, SyncStatus,
};
