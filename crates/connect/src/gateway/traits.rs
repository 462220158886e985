use async_trait::async_trait;
use serde_json::Value;

use super::ApiResponse;
use omie_core::credentials::Credentials;

/// Single POST to one Omie procedure.
///
/// Implementations never fail: transport and protocol problems come back as
/// [`ApiResponse::Error`], and no call is retried.
#[async_trait]
pub trait OmieGateway: Send + Sync {
    async fn call(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        call: &str,
        param: &Value,
    ) -> ApiResponse<Value>;
}
