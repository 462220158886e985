/// Persisted key for the active application key.
pub const APP_KEY_KEY: &str = "omie_app_key";

/// Persisted key for the active application secret.
pub const APP_SECRET_KEY: &str = "omie_app_secret";

/// Persisted key for the proxy toggle (`"true"` / `"false"`).
pub const USE_PROXY_KEY: &str = "omie_use_proxy";

/// Persisted key for the forwarding proxy base URL.
pub const PROXY_URL_KEY: &str = "omie_proxy_url";

/// Persisted key for the saved credential profiles (JSON list).
pub const PROFILES_KEY: &str = "omie_credential_profiles";

/// Persisted key for the connection log (JSON list, newest first).
pub const CONNECTION_LOGS_KEY: &str = "omie_connection_logs";

/// Keys removed by a "clear sensitive data" request.
pub const SENSITIVE_KEYS: &[&str] = &[
    APP_KEY_KEY,
    APP_SECRET_KEY,
    PROFILES_KEY,
    CONNECTION_LOGS_KEY,
];

/// Proxy tunnel used when nothing has been configured yet.
pub const DEFAULT_PROXY_URL: &str = "https://cors-anywhere.herokuapp.com";

/// Entries kept by the in-process connection log ring.
pub const LOG_RING_CAPACITY: usize = 50;

/// Entries kept by the startup maintenance pass.
pub const MAINTENANCE_LOG_LIMIT: usize = 100;

/// Age after which the startup maintenance pass drops a log entry.
pub const LOG_RETENTION_DAYS: i64 = 7;

/// Log method tags that are not remote procedure names.
pub const LOG_METHOD_CONFIG: &str = "CONFIG";
pub const LOG_METHOD_CORS_AUTO: &str = "CORS_AUTO";
pub const LOG_METHOD_API_SYNC: &str = "API_SYNC";
pub const LOG_METHOD_JSON_ERROR: &str = "JSON_ERRO";
pub const LOG_METHOD_PROFILE: &str = "PROFILE";
