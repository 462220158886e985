//! Gateway to the Omie API: envelope, URL resolution, and response
//! classification.

mod client;
mod response;
mod traits;

pub use client::{build_envelope, classify, resolve_url, OmieApiClient, DEFAULT_TIMEOUT};
pub use response::*;
pub use traits::OmieGateway;
