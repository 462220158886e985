use std::sync::{Arc, RwLock};

use log::{debug, warn};

use super::{ConnectionLog, LogStatus};
use crate::constants::CONNECTION_LOGS_KEY;
use crate::errors::{Result, StorageError};
use crate::settings::{read_json, write_json, SettingsStore};

/// Append-only connection log kept newest first.
pub trait ConnectionLogServiceTrait: Send + Sync {
    /// Record an entry. Persisting is best effort: a store failure is logged
    /// and the entry stays in memory.
    fn record(&self, entry: ConnectionLog) -> ConnectionLog;

    fn append(&self, method: &str, status: LogStatus, message: &str) -> ConnectionLog {
        self.record(ConnectionLog::new(method, status, message))
    }

    /// All retained entries, most recent first.
    fn list(&self) -> Vec<ConnectionLog>;

    /// Drop every entry.
    fn clear(&self) -> Result<()>;
}

pub struct ConnectionLogService {
    store: Arc<dyn SettingsStore>,
    entries: RwLock<Vec<ConnectionLog>>,
    capacity: usize,
}

impl ConnectionLogService {
    /// Create the log, seeding it with the persisted entries.
    ///
    /// An unreadable persisted list is discarded rather than failing startup.
    pub fn new(store: Arc<dyn SettingsStore>, capacity: usize) -> Self {
        let mut entries: Vec<ConnectionLog> = match read_json(store.as_ref(), CONNECTION_LOGS_KEY)
        {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!("[ConnectionLog] Discarding unreadable log list: {}", e);
                Vec::new()
            }
        };
        entries.truncate(capacity);

        Self {
            store,
            entries: RwLock::new(entries),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn persist(&self, entries: &[ConnectionLog]) {
        if let Err(e) = write_json(self.store.as_ref(), CONNECTION_LOGS_KEY, entries) {
            warn!("[ConnectionLog] Failed to persist log: {}", e);
        }
    }
}

impl ConnectionLogServiceTrait for ConnectionLogService {
    fn record(&self, entry: ConnectionLog) -> ConnectionLog {
        debug!(
            "[ConnectionLog] {} {}: {}",
            entry.method, entry.status, entry.message
        );

        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(0, entry.clone());
        entries.truncate(self.capacity);
        self.persist(&entries);
        entry
    }

    fn list(&self) -> Vec<ConnectionLog> {
        match self.entries.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        entries.clear();
        self.store.remove(CONNECTION_LOGS_KEY)
    }
}
