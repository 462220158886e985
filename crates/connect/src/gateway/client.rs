//! HTTP client for the Omie JSON API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::{ApiResponse, GatewayError, OmieGateway};
use omie_core::credentials::Credentials;
use omie_core::errors::{Error, Result};
use omie_core::sanitize::sanitize;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header the CORS proxy tunnel requires on forwarded requests.
const X_REQUESTED_WITH: &str = "x-requested-with";

/// reqwest-backed [`OmieGateway`].
///
/// # Example
///
/// ```ignore
/// let client = OmieApiClient::new(Duration::from_secs(30))?;
/// let response = client
///     .call(&credentials, &endpoint, "ListarClientes", &param)
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct OmieApiClient {
    client: reqwest::Client,
}

impl OmieApiClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(X_REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        headers
    }
}

#[async_trait]
impl OmieGateway for OmieApiClient {
    async fn call(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        call: &str,
        param: &Value,
    ) -> ApiResponse<Value> {
        let url = resolve_url(credentials, endpoint);
        let envelope = build_envelope(credentials, call, param);
        debug!("[Gateway] POST {} ({})", url, call);

        let response = match self
            .client
            .post(&url)
            .headers(Self::headers())
            .json(&envelope)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("[Gateway] {} failed before a response: {}", call, e);
                return ApiResponse::Error(GatewayError::network(e.to_string()));
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("[Gateway] {} body could not be read: {}", call, e);
                return ApiResponse::Error(GatewayError::network(e.to_string()));
            }
        };

        let classified = classify(status, content_type.as_deref(), &body);
        if let Some(message) = classified.failure_message() {
            debug!("[Gateway] {} answered {} with a failure: {}", call, status, message);
        }
        classified
    }
}

/// Proxy base joined with the endpoint when the tunnel is on, the endpoint
/// itself otherwise.
pub fn resolve_url(credentials: &Credentials, endpoint: &str) -> String {
    match credentials.proxy_base() {
        Some(proxy) => format!("{}/{}", proxy.trim_end_matches('/'), endpoint),
        None => endpoint.to_string(),
    }
}

/// The JSON body every Omie procedure expects. Credentials are trimmed and
/// the parameter is sanitized.
pub fn build_envelope(credentials: &Credentials, call: &str, param: &Value) -> Value {
    json!({
        "call": call,
        "app_key": credentials.app_key.trim(),
        "app_secret": credentials.app_secret.trim(),
        "param": sanitize(param),
    })
}

/// Map a completed HTTP exchange onto [`ApiResponse`].
pub fn classify(status: StatusCode, content_type: Option<&str>, body: &str) -> ApiResponse<Value> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

    if status == StatusCode::FORBIDDEN && !is_json {
        return ApiResponse::Error(GatewayError::proxy_blocked());
    }

    if !is_json {
        return ApiResponse::Error(GatewayError::protocol(status.as_u16(), body));
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => ApiResponse::from_body(value),
        Err(e) => {
            warn!("[Gateway] JSON content type with unparsable body: {}", e);
            let mut error = GatewayError::protocol(status.as_u16(), body);
            error.fatal = true;
            ApiResponse::Error(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ErrorReferer;

    fn credentials(use_proxy: bool, proxy_url: &str) -> Credentials {
        Credentials::new(" key ", " secret ").with_proxy(use_proxy, proxy_url)
    }

    #[test]
    fn direct_url_when_proxy_disabled() {
        let creds = credentials(false, "https://proxy.example");
        assert_eq!(
            resolve_url(&creds, "https://app.omie.com.br/api/v1/geral/clientes/"),
            "https://app.omie.com.br/api/v1/geral/clientes/"
        );
    }

    #[test]
    fn proxy_url_strips_one_trailing_slash() {
        let creds = credentials(true, "https://proxy.example/");
        assert_eq!(
            resolve_url(&creds, "https://app.omie.com.br/api/v1/geral/clientes/"),
            "https://proxy.example/https://app.omie.com.br/api/v1/geral/clientes/"
        );
    }

    #[test]
    fn empty_proxy_url_falls_back_to_direct() {
        let creds = credentials(true, "  ");
        assert_eq!(resolve_url(&creds, "https://x/"), "https://x/");
    }

    #[test]
    fn envelope_trims_credentials_and_sanitizes() {
        let envelope = build_envelope(
            &credentials(false, ""),
            "ListarClientes",
            &json!({ "pagina": 1, "filtro": null, "tags": [null, 0] }),
        );
        assert_eq!(envelope["app_key"], "key");
        assert_eq!(envelope["app_secret"], "secret");
        assert_eq!(envelope["call"], "ListarClientes");
        assert_eq!(envelope["param"], json!({ "pagina": 1, "tags": [0] }));
    }

    #[test]
    fn forbidden_html_is_proxy_block() {
        let response = classify(StatusCode::FORBIDDEN, Some("text/html"), "<html>denied</html>");
        let error = response.gateway_error().unwrap();
        assert_eq!(error.code, "PROXY_AUTH_REQUIRED");
        assert_eq!(error.referer, ErrorReferer::ProxyBlock);
        assert!(error.fatal);
    }

    #[test]
    fn forbidden_json_passes_through() {
        let response = classify(
            StatusCode::FORBIDDEN,
            Some("application/json; charset=utf-8"),
            r#"{"faultstring":"Acesso negado","faultcode":"SOAP-ENV:Client-1"}"#,
        );
        assert_eq!(response.fault_string(), Some("Acesso negado"));
    }

    #[test]
    fn server_error_text_is_fatal_protocol_error() {
        let response = classify(StatusCode::BAD_GATEWAY, Some("text/plain"), "upstream down");
        let error = response.gateway_error().unwrap();
        assert_eq!(error.code, "502");
        assert_eq!(error.referer, ErrorReferer::HttpProtocol);
        assert!(error.fatal);
    }

    #[test]
    fn client_error_text_is_not_fatal() {
        let response = classify(StatusCode::NOT_FOUND, None, "missing");
        let error = response.gateway_error().unwrap();
        assert_eq!(error.code, "404");
        assert!(!error.fatal);
    }

    #[test]
    fn json_success_passes_through() {
        let response = classify(
            StatusCode::OK,
            Some("application/json"),
            r#"{"pagina":1,"clientes_cadastro":[]}"#,
        );
        assert!(response.is_success());
    }
}
