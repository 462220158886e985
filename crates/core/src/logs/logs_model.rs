//! Connection log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome tag of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
    Pending,
    System,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogStatus::Success => write!(f, "success"),
            LogStatus::Error => write!(f, "error"),
            LogStatus::Pending => write!(f, "pending"),
            LogStatus::System => write!(f, "system"),
        }
    }
}

/// One entry of the connection log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Remote procedure name, or a pseudo-tag such as `SYSTEM` or `JSON_ERRO`.
    pub method: String,
    pub status: LogStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ConnectionLog {
    pub fn new(method: impl Into<String>, status: LogStatus, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            method: method.into(),
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
