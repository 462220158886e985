//! Credential domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PROXY_URL;

/// The active key/secret pair and how requests reach the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: String,
    /// Route requests through the forwarding proxy at `proxy_url`.
    pub use_proxy: bool,
    pub proxy_url: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            use_proxy: true,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

impl Credentials {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_proxy(mut self, use_proxy: bool, proxy_url: impl Into<String>) -> Self {
        self.use_proxy = use_proxy;
        self.proxy_url = proxy_url.into();
        self
    }

    /// Both the key and the secret carry a non-blank value.
    pub fn is_complete(&self) -> bool {
        !self.app_key.trim().is_empty() && !self.app_secret.trim().is_empty()
    }

    /// Copy with surrounding whitespace removed from every text field.
    pub fn trimmed(&self) -> Self {
        Self {
            app_key: self.app_key.trim().to_string(),
            app_secret: self.app_secret.trim().to_string(),
            use_proxy: self.use_proxy,
            proxy_url: self.proxy_url.trim().to_string(),
        }
    }

    /// The proxy base URL when requests should be tunnelled, `None` otherwise.
    pub fn proxy_base(&self) -> Option<&str> {
        let url = self.proxy_url.trim();
        if self.use_proxy && !url.is_empty() {
            Some(url)
        } else {
            None
        }
    }

    /// Copy safe to hand to a client: the secret keeps only its last four
    /// characters.
    pub fn masked(&self) -> Self {
        let secret = self.app_secret.trim();
        let visible: String = secret
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let app_secret = if secret.chars().count() > 4 {
            format!("****{}", visible)
        } else if secret.is_empty() {
            String::new()
        } else {
            "****".to_string()
        };
        Self {
            app_secret,
            ..self.clone()
        }
    }
}

/// A named, immutable snapshot of a credential set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProfile {
    pub id: String,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// Input for creating a profile. When `credentials` is absent the active
/// credentials are captured.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}
