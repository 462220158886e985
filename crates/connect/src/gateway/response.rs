//! Normalized shape of every gateway call.
//!
//! The upstream API answers in three ways: the procedure payload, a SOAP-style
//! fault (`faultcode`/`faultstring`, possibly inside HTTP 200), or an
//! `error` member (an object, or plain text). The gateway adds its own synthetic errors for
//! transport and protocol failures. [`ApiResponse`] folds all of them into one
//! closed union so callers never probe optional fields.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Gateway error codes produced locally.
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";
pub const PROXY_AUTH_REQUIRED_CODE: &str = "PROXY_AUTH_REQUIRED";

/// Maximum number of body characters quoted in a protocol error.
pub const BODY_EXCERPT_CHARS: usize = 100;

/// Which layer produced a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReferer {
    /// The proxy tunnel refused the request.
    ProxyBlock,
    /// The server answered with something that is not JSON.
    HttpProtocol,
    /// The request never completed (DNS, refused, timeout, CORS).
    BrowserCors,
    /// Reported by the upstream application itself.
    #[default]
    #[serde(other)]
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayError {
    #[serde(deserialize_with = "string_or_number")]
    pub code: String,
    pub description: String,
    pub referer: ErrorReferer,
    pub fatal: bool,
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            code: NETWORK_ERROR_CODE.to_string(),
            description: message.into(),
            referer: ErrorReferer::BrowserCors,
            fatal: true,
        }
    }

    pub fn proxy_blocked() -> Self {
        Self {
            code: PROXY_AUTH_REQUIRED_CODE.to_string(),
            description: "The CORS proxy requires authorization. Request temporary access \
                          on the proxy page and try again."
                .to_string(),
            referer: ErrorReferer::ProxyBlock,
            fatal: true,
        }
    }

    /// Non-JSON answer. Quotes the start of the body.
    pub fn protocol(status: u16, body: &str) -> Self {
        Self {
            code: status.to_string(),
            description: format!("Inconsistent response: {}", excerpt(body)),
            referer: ErrorReferer::HttpProtocol,
            fatal: status >= 500,
        }
    }

    /// Produced by the gateway rather than reported by the upstream application.
    pub fn is_synthetic(&self) -> bool {
        self.referer != ErrorReferer::Application
    }

    pub fn is_network(&self) -> bool {
        self.code == NETWORK_ERROR_CODE
    }
}

/// Result of one gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Fault {
        faultcode: String,
        faultstring: String,
    },
    Error(GatewayError),
}

impl ApiResponse<Value> {
    /// Classify a decoded JSON body.
    pub fn from_body(body: Value) -> Self {
        match body.get("error") {
            None | Some(Value::Null) => {}
            Some(error @ Value::Object(_)) => {
                let error = serde_json::from_value::<GatewayError>(error.clone())
                    .unwrap_or_else(|e| GatewayError {
                        code: String::new(),
                        description: format!("Unreadable error object: {}", e),
                        referer: ErrorReferer::Application,
                        fatal: false,
                    });
                return ApiResponse::Error(error);
            }
            Some(_) => {
                return ApiResponse::Error(GatewayError {
                    description: text_field(&body, "error"),
                    ..GatewayError::default()
                });
            }
        }

        if body.get("faultstring").is_some() || body.get("faultcode").is_some() {
            return ApiResponse::Fault {
                faultcode: text_field(&body, "faultcode"),
                faultstring: text_field(&body, "faultstring"),
            };
        }

        ApiResponse::Success(body)
    }

    /// Decode the success payload into a typed shape. Failures are left as is.
    pub fn decode<U: DeserializeOwned>(self) -> Result<ApiResponse<U>, serde_json::Error> {
        match self {
            ApiResponse::Success(body) => Ok(ApiResponse::Success(serde_json::from_value(body)?)),
            ApiResponse::Fault {
                faultcode,
                faultstring,
            } => Ok(ApiResponse::Fault {
                faultcode,
                faultstring,
            }),
            ApiResponse::Error(error) => Ok(ApiResponse::Error(error)),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiResponse::Error(error) if error.is_network())
    }

    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            ApiResponse::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn fault_string(&self) -> Option<&str> {
        match self {
            ApiResponse::Fault { faultstring, .. } => Some(faultstring.as_str()),
            _ => None,
        }
    }

    /// Human-readable failure text, `None` for a success.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            ApiResponse::Success(_) => None,
            ApiResponse::Fault {
                faultcode,
                faultstring,
            } => Some(if faultstring.is_empty() {
                faultcode.clone()
            } else {
                faultstring.clone()
            }),
            ApiResponse::Error(error) => Some(if error.description.is_empty() {
                error.code.clone()
            } else {
                error.description.clone()
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireResponse<'a, T> {
    Success(&'a T),
    Fault {
        faultcode: &'a str,
        faultstring: &'a str,
    },
    Error {
        error: &'a GatewayError,
    },
}

/// Serializes back to the upstream wire shape.
impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            ApiResponse::Success(payload) => WireResponse::Success(payload),
            ApiResponse::Fault {
                faultcode,
                faultstring,
            } => WireResponse::Fault {
                faultcode,
                faultstring,
            },
            ApiResponse::Error(error) => WireResponse::Error { error },
        };
        wire.serialize(serializer)
    }
}

/// Pagination counters shared by every listing procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub pagina: Option<i64>,
    pub total_de_paginas: Option<i64>,
    pub registros: Option<i64>,
    pub total_de_registros: Option<i64>,
}

/// A decoded listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub pagination: Pagination,
    pub records: Vec<T>,
}

/// Decode a listing payload whose records live under `list_field`.
/// An absent or null list field decodes as an empty page.
pub fn decode_page<T: DeserializeOwned>(
    body: Value,
    list_field: &str,
) -> Result<Page<T>, serde_json::Error> {
    let mut body = body;
    let records = match body.get_mut(list_field).map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(list) => serde_json::from_value(list)?,
    };
    let pagination = serde_json::from_value(body)?;
    Ok(Page {
        pagination,
        records,
    })
}

/// First `BODY_EXCERPT_CHARS` characters of `body`.
pub fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn text_field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_body_is_success() {
        let response = ApiResponse::from_body(json!({ "pagina": 1, "clientes_cadastro": [] }));
        assert!(response.is_success());
        assert!(response.failure_message().is_none());
    }

    #[test]
    fn fault_inside_ok_body_is_fault() {
        let response = ApiResponse::from_body(json!({
            "faultstring": "ERROR: Chave de acesso inválida",
            "faultcode": "SOAP-ENV:Client-5113"
        }));
        assert_eq!(response.fault_string(), Some("ERROR: Chave de acesso inválida"));
        assert!(!response.is_success());
    }

    #[test]
    fn application_error_defaults_referer() {
        let response = ApiResponse::from_body(json!({
            "error": { "code": 1001, "description": "Registro não encontrado" }
        }));
        let error = response.gateway_error().unwrap();
        assert_eq!(error.code, "1001");
        assert_eq!(error.referer, ErrorReferer::Application);
        assert!(!error.is_synthetic());
    }

    #[test]
    fn plain_error_text_is_application_error() {
        let response = ApiResponse::from_body(json!({ "error": "Application key invalid" }));
        assert!(!response.is_success());
        let error = response.gateway_error().unwrap();
        assert_eq!(error.description, "Application key invalid");
        assert_eq!(error.referer, ErrorReferer::Application);
        assert_eq!(response.failure_message().as_deref(), Some("Application key invalid"));
    }

    #[test]
    fn null_error_is_ignored() {
        let response = ApiResponse::from_body(json!({ "error": null, "clientes_cadastro": [] }));
        assert!(response.is_success());
    }

    #[test]
    fn protocol_error_quotes_at_most_one_hundred_chars() {
        let body = "x".repeat(250);
        let error = GatewayError::protocol(502, &body);
        assert_eq!(error.code, "502");
        assert!(error.fatal);
        assert_eq!(error.description.matches('x').count(), BODY_EXCERPT_CHARS);

        let short = GatewayError::protocol(404, "Not Found");
        assert!(!short.fatal);
        assert!(short.description.ends_with("Not Found"));
    }

    #[test]
    fn error_serializes_to_wire_shape() {
        let response: ApiResponse<Value> = ApiResponse::Error(GatewayError::network("refused"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["code"], "NETWORK_ERROR");
        assert_eq!(json["error"]["referer"], "BROWSER_CORS");
        assert_eq!(json["error"]["fatal"], true);
    }

    #[test]
    fn decode_page_handles_missing_list() {
        let page: Page<Value> =
            decode_page(json!({ "pagina": 1, "total_de_paginas": 1 }), "conta_pagar_cadastro")
                .unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.pagination.total_de_paginas, Some(1));
    }

    #[test]
    fn decode_page_rejects_wrong_list_type() {
        let result: Result<Page<Value>, _> =
            decode_page(json!({ "clientes_cadastro": "oops" }), "clientes_cadastro");
        assert!(result.is_err());
    }
}
