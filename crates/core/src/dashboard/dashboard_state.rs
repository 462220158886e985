use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{DashboardSnapshot, SnapshotUpdate};

/// Shared holder for the current [`DashboardSnapshot`].
#[derive(Debug, Default)]
pub struct DashboardState {
    snapshot: RwLock<DashboardSnapshot>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace every list carried by `update` and stamp the sync time.
    pub fn apply(&self, update: SnapshotUpdate, synced_at: DateTime<Utc>) {
        let mut guard = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(receivables) = update.receivables {
            guard.receivables = receivables;
        }
        if let Some(payables) = update.payables {
            guard.payables = payables;
        }
        if let Some(clients) = update.clients {
            guard.clients = clients;
        }
        if let Some(sales) = update.sales {
            guard.sales = sales;
        }
        guard.last_synced_at = Some(synced_at);
    }

    pub fn clear(&self) {
        let mut guard = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = DashboardSnapshot::default();
    }
}
