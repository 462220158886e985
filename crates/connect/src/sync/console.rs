//! Raw call console: send any procedure with a hand-written JSON parameter.

use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{join_endpoint, OmieService};
use crate::gateway::{ApiResponse, OmieGateway};
use omie_core::constants::LOG_METHOD_JSON_ERROR;
use omie_core::credentials::CredentialsServiceTrait;
use omie_core::errors::{Result, ValidationError};
use omie_core::logs::{ConnectionLog, ConnectionLogServiceTrait, LogStatus};

/// A console request. Either `service` or `endpoint` picks the target;
/// `call` defaults to the service's listing procedure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleRequest {
    pub service: Option<OmieService>,
    pub endpoint: Option<String>,
    pub call: Option<String>,
    /// Parameter object as JSON text, parsed before anything is sent.
    #[serde(default)]
    pub param: String,
}

pub struct RawCallConsole {
    gateway: Arc<dyn OmieGateway>,
    credentials: Arc<dyn CredentialsServiceTrait>,
    logs: Arc<dyn ConnectionLogServiceTrait>,
    base_url: String,
}

impl RawCallConsole {
    pub fn new(
        gateway: Arc<dyn OmieGateway>,
        credentials: Arc<dyn CredentialsServiceTrait>,
        logs: Arc<dyn ConnectionLogServiceTrait>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            logs,
            base_url: base_url.into(),
        }
    }

    /// Send the request with the active credentials and return the gateway
    /// result unchanged.
    ///
    /// Malformed parameter JSON is logged and rejected without a network call.
    pub async fn execute(&self, request: ConsoleRequest) -> Result<ApiResponse<Value>> {
        let param = match parse_param(&request.param) {
            Ok(param) => param,
            Err(err) => {
                warn!("[Console] Rejected parameter: {}", err);
                self.logs.append(
                    LOG_METHOD_JSON_ERROR,
                    LogStatus::Error,
                    &format!("Invalid parameter JSON: {}", err),
                );
                return Err(err.into());
            }
        };

        let (endpoint, call) = self.resolve_target(&request)?;
        let credentials = self.credentials.active();
        info!("[Console] Sending {} to {}", call, endpoint);

        let response = self
            .gateway
            .call(&credentials, &endpoint, &call, &param)
            .await;

        let entry = match response.failure_message() {
            None => ConnectionLog::new(&call, LogStatus::Success, "Console call succeeded."),
            Some(message) => ConnectionLog::new(
                &call,
                LogStatus::Error,
                format!("Console call failed: {}", message),
            ),
        };
        self.logs.record(entry.with_details(endpoint));

        Ok(response)
    }

    fn resolve_target(&self, request: &ConsoleRequest) -> Result<(String, String)> {
        let endpoint = match (&request.endpoint, request.service) {
            (Some(endpoint), _) if !endpoint.trim().is_empty() => {
                join_endpoint(&self.base_url, endpoint)
            }
            (_, Some(service)) => join_endpoint(&self.base_url, service.path()),
            _ => return Err(ValidationError::MissingField("endpoint".to_string()).into()),
        };

        let call = match (&request.call, request.service) {
            (Some(call), _) if !call.trim().is_empty() => call.trim().to_string(),
            (_, Some(service)) => service.call().to_string(),
            _ => return Err(ValidationError::MissingField("call".to_string()).into()),
        };

        Ok((endpoint, call))
    }
}

/// Parse the console parameter. Blank text means an empty object.
pub fn parse_param(text: &str) -> std::result::Result<Value, ValidationError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson(e.to_string()))
}
