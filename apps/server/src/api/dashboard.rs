use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ApiResult, main_lib::AppState};
use omie_core::dashboard::{
    cash_flow_report, client_balances, search_clients, summarize, CashFlowLine, Client,
    ClientBalance, DashboardSummary, FinancialEntry,
};

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    #[serde(flatten)]
    summary: DashboardSummary,
    syncing: bool,
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardResponse>> {
    let snapshot = state.dashboard.snapshot();
    Ok(Json(DashboardResponse {
        summary: summarize(&snapshot),
        syncing: state.sync_orchestrator.is_running(),
    }))
}

async fn list_receivables(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<FinancialEntry>>> {
    Ok(Json(state.dashboard.snapshot().receivables))
}

async fn list_payables(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<FinancialEntry>>> {
    Ok(Json(state.dashboard.snapshot().payables))
}

async fn list_clients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Client>>> {
    let snapshot = state.dashboard.snapshot();
    Ok(Json(search_clients(&snapshot.clients, &query.q)))
}

async fn list_sales(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(state.dashboard.snapshot().sales))
}

async fn get_cash_flow(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CashFlowLine>>> {
    Ok(Json(cash_flow_report(&state.dashboard.snapshot())))
}

async fn search_balances(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ClientBalance>>> {
    let snapshot = state.dashboard.snapshot();
    Ok(Json(client_balances(&snapshot.receivables, &query.q)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/receivables", get(list_receivables))
        .route("/payables", get(list_payables))
        .route("/clients", get(list_clients))
        .route("/sales", get(list_sales))
        .route("/reports/cash-flow", get(get_cash_flow))
        .route("/search/balances", get(search_balances))
}
