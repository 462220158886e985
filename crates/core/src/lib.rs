//! Omie Core - Domain models, persisted settings, and maintenance.
//!
//! This crate holds everything the dashboard knows without talking to the
//! network: credentials and profiles, the connection log, the fetched
//! snapshot with its derived views, payload sanitizing and the startup
//! maintenance pass. Persistence goes through the [`settings::SettingsStore`]
//! trait, implemented by the `omie-storage-file` crate.

pub mod constants;
pub mod credentials;
pub mod dashboard;
pub mod errors;
pub mod logs;
pub mod maintenance;
pub mod sanitize;
pub mod settings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
