//! Dashboard module - fetched records, the live snapshot and derived views.

mod dashboard_model;
mod dashboard_state;
mod summary;


pub use dashboard_model::{Client, DashboardSnapshot, EntityKind, FinancialEntry, SnapshotUpdate};
pub use dashboard_state::DashboardState;
pub use summary::{
    cash_flow_report, client_balances, search_clients, summarize, CashFlowDirection, CashFlowLine,
    ClientBalance, DashboardSummary, PREVIEW_ROWS,
};
