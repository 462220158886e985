//! Derived views over a [`DashboardSnapshot`]: summary cards, the cash-flow
//! report and the two searches.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Client, DashboardSnapshot, FinancialEntry};

/// Number of rows shown in each summary preview list.
pub const PREVIEW_ROWS: usize = 5;

/// Totals shown on the executive panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_receivable: Decimal,
    pub total_payable: Decimal,
    /// `total_receivable - total_payable`
    pub balance: Decimal,
    pub receivable_count: usize,
    pub payable_count: usize,
    pub client_count: usize,
    pub last_synced_at: Option<DateTime<Utc>>,
    /// First rows of each list, in upstream order.
    pub receivables_preview: Vec<FinancialEntry>,
    pub payables_preview: Vec<FinancialEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashFlowDirection {
    Receivable,
    Payable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowLine {
    pub direction: CashFlowDirection,
    #[serde(flatten)]
    pub entry: FinancialEntry,
}

/// Receivables aggregated per counterparty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBalance {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

pub fn summarize(snapshot: &DashboardSnapshot) -> DashboardSummary {
    let total_receivable = sum_values(&snapshot.receivables);
    let total_payable = sum_values(&snapshot.payables);

    DashboardSummary {
        total_receivable,
        total_payable,
        balance: total_receivable.saturating_sub(total_payable),
        receivable_count: snapshot.receivables.len(),
        payable_count: snapshot.payables.len(),
        client_count: snapshot.clients.len(),
        last_synced_at: snapshot.last_synced_at,
        receivables_preview: snapshot.receivables.iter().take(PREVIEW_ROWS).cloned().collect(),
        payables_preview: snapshot.payables.iter().take(PREVIEW_ROWS).cloned().collect(),
    }
}

/// Receivables and payables in one list, largest document value first.
/// Equal values keep receivables ahead of payables and upstream order.
pub fn cash_flow_report(snapshot: &DashboardSnapshot) -> Vec<CashFlowLine> {
    let mut lines: Vec<CashFlowLine> = snapshot
        .receivables
        .iter()
        .map(|entry| CashFlowLine {
            direction: CashFlowDirection::Receivable,
            entry: entry.clone(),
        })
        .chain(snapshot.payables.iter().map(|entry| CashFlowLine {
            direction: CashFlowDirection::Payable,
            entry: entry.clone(),
        }))
        .collect();

    lines.sort_by(|a, b| b.entry.valor_documento.cmp(&a.entry.valor_documento));
    lines
}

/// Group receivables by counterparty name, keep the names containing `term`
/// (case-insensitive), largest total first.
pub fn client_balances(receivables: &[FinancialEntry], term: &str) -> Vec<ClientBalance> {
    let mut order: Vec<ClientBalance> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in receivables {
        let name = entry.nome_cliente_fornecedor.as_str();
        match index.get(name) {
            Some(&pos) => {
                order[pos].total = order[pos].total.saturating_add(entry.valor_documento);
                order[pos].count += 1;
            }
            None => {
                index.insert(name, order.len());
                order.push(ClientBalance {
                    name: name.to_string(),
                    total: entry.valor_documento,
                    count: 1,
                });
            }
        }
    }

    let needle = term.trim().to_lowercase();
    let mut balances: Vec<ClientBalance> = order
        .into_iter()
        .filter(|b| needle.is_empty() || b.name.to_lowercase().contains(&needle))
        .collect();
    balances.sort_by(|a, b| b.total.cmp(&a.total));
    balances
}

/// Clients whose trade name, legal name or tax id contains `term`
/// (case-insensitive). An empty term returns everything.
pub fn search_clients(clients: &[Client], term: &str) -> Vec<Client> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return clients.to_vec();
    }

    clients
        .iter()
        .filter(|c| {
            c.nome_fantasia.to_lowercase().contains(&needle)
                || c.razao_social.to_lowercase().contains(&needle)
                || c.cnpj_cpf.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Saturates at the `Decimal` bounds instead of panicking.
fn sum_values(entries: &[FinancialEntry]) -> Decimal {
    entries
        .iter()
        .fold(Decimal::ZERO, |total, e| total.saturating_add(e.valor_documento))
}
