//! Records fetched from the ERP and the in-memory snapshot built from them.
//!
//! Record structs keep the upstream field names so the same type decodes the
//! API payload and serializes back to dashboard clients unchanged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A receivable or payable title (`conta_receber_cadastro` /
/// `conta_pagar_cadastro` items).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialEntry {
    pub codigo_lancamento: i64,
    pub data_vencimento: String,
    pub valor_documento: Decimal,
    pub status_titulo: String,
    pub nome_cliente_fornecedor: String,
    pub codigo_cliente_fornecedor: i64,
}

/// A client directory record (`clientes_cadastro` items).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub codigo_cliente_omie: i64,
    pub nome_fantasia: String,
    pub razao_social: String,
    pub cnpj_cpf: String,
}

/// Entity families the dashboard keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Receivables,
    Payables,
    Clients,
    Sales,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Receivables => write!(f, "receivables"),
            EntityKind::Payables => write!(f, "payables"),
            EntityKind::Clients => write!(f, "clients"),
            EntityKind::Sales => write!(f, "sales"),
        }
    }
}

/// Everything the last successful syncs produced.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub receivables: Vec<FinancialEntry>,
    pub payables: Vec<FinancialEntry>,
    pub clients: Vec<Client>,
    /// Authorized invoices, kept as the upstream records.
    pub sales: Vec<Value>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Lists produced by one successful sync. `None` leaves the current list
/// alone; `Some` replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct SnapshotUpdate {
    pub receivables: Option<Vec<FinancialEntry>>,
    pub payables: Option<Vec<FinancialEntry>>,
    pub clients: Option<Vec<Client>>,
    pub sales: Option<Vec<Value>>,
}

impl SnapshotUpdate {
    /// Entity kinds this update replaces.
    pub fn kinds(&self) -> Vec<EntityKind> {
        let mut kinds = Vec::new();
        if self.receivables.is_some() {
            kinds.push(EntityKind::Receivables);
        }
        if self.payables.is_some() {
            kinds.push(EntityKind::Payables);
        }
        if self.clients.is_some() {
            kinds.push(EntityKind::Clients);
        }
        if self.sales.is_some() {
            kinds.push(EntityKind::Sales);
        }
        kinds
    }
}
