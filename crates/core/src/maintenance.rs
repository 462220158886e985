//! Startup hygiene for persisted state.
//!
//! Run [`perform_maintenance`] once at process start, before any service
//! reads the store. It trims the connection log by age and count and drops
//! saved profiles that lost a required field.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    CONNECTION_LOGS_KEY, LOG_RETENTION_DAYS, MAINTENANCE_LOG_LIMIT, PROFILES_KEY, SENSITIVE_KEYS,
};
use crate::errors::Result;
use crate::logs::ConnectionLog;
use crate::settings::{read_json, write_json, SettingsStore};

/// What a maintenance pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub logs_kept: usize,
    pub logs_dropped: usize,
    /// The persisted log list could not be read and was removed.
    pub logs_reset: bool,
    pub profiles_dropped: usize,
    /// The persisted profile list could not be read and was removed.
    pub profiles_reset: bool,
}

/// Prune the connection log and the saved profiles.
///
/// Log entries older than the retention window are dropped, then only the
/// most recent [`MAINTENANCE_LOG_LIMIT`] are kept. Profiles missing an id, a
/// key or a secret are dropped. Lists that do not parse are removed whole.
pub fn perform_maintenance(store: &dyn SettingsStore, now: DateTime<Utc>) -> Result<MaintenanceReport> {
    info!("[Maintenance] Starting housekeeping pass");
    let mut report = MaintenanceReport::default();

    match read_json::<Vec<ConnectionLog>>(store, CONNECTION_LOGS_KEY) {
        Ok(Some(mut logs)) => {
            let before = logs.len();
            let cutoff = now - Duration::days(LOG_RETENTION_DAYS);
            logs.retain(|entry| entry.timestamp > cutoff);
            logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            logs.truncate(MAINTENANCE_LOG_LIMIT);

            write_json(store, CONNECTION_LOGS_KEY, &logs)?;
            report.logs_kept = logs.len();
            report.logs_dropped = before - logs.len();
            info!(
                "[Maintenance] Connection log trimmed: {} kept, {} dropped",
                report.logs_kept, report.logs_dropped
            );
        }
        Ok(None) => {}
        Err(e) => {
            warn!("[Maintenance] Removing unreadable connection log: {}", e);
            store.remove(CONNECTION_LOGS_KEY)?;
            report.logs_reset = true;
        }
    }

    match read_json::<Vec<Value>>(store, PROFILES_KEY) {
        Ok(Some(profiles)) => {
            let before = profiles.len();
            let valid: Vec<Value> = profiles.into_iter().filter(is_valid_profile).collect();
            if valid.len() != before {
                write_json(store, PROFILES_KEY, &valid)?;
                report.profiles_dropped = before - valid.len();
                warn!(
                    "[Maintenance] Dropped {} incomplete credential profiles",
                    report.profiles_dropped
                );
            }
        }
        Ok(None) => {}
        Err(e) => {
            warn!("[Maintenance] Removing unreadable profile list: {}", e);
            store.remove(PROFILES_KEY)?;
            report.profiles_reset = true;
        }
    }

    Ok(report)
}

/// Remove credentials, profiles and the connection log from the store.
pub fn clear_sensitive_data(store: &dyn SettingsStore) -> Result<()> {
    for key in SENSITIVE_KEYS {
        store.remove(key)?;
    }
    info!("[Maintenance] Sensitive data cleared");
    Ok(())
}

fn is_valid_profile(profile: &Value) -> bool {
    let non_empty = |field: &str| {
        profile
            .get(field)
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    };
    non_empty("id") && non_empty("appKey") && non_empty("appSecret")
}
