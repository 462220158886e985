//! The Omie procedures the dashboard knows how to call.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use omie_core::dashboard::EntityKind;
use omie_core::errors::ValidationError;

/// Default base URL of the Omie JSON API.
pub const DEFAULT_API_BASE_URL: &str = "https://app.omie.com.br/api/v1";

/// Date format the Omie filters expect.
const OMIE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Inclusive date window used by the filtered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// January 1st through December 31st of `today`'s year.
    pub fn calendar_year(today: NaiveDate) -> Self {
        let year = today.year();
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
        let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
        Self { start, end }
    }

    pub fn start_param(&self) -> String {
        self.start.format(OMIE_DATE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(OMIE_DATE_FORMAT).to_string()
    }
}

/// One prepared call: where to POST, which procedure, and its parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct OmieRequest {
    pub service: OmieService,
    pub endpoint: String,
    pub call: String,
    pub param: Value,
}

/// Listing procedures exposed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OmieService {
    Receivable,
    Payable,
    Clients,
    Sales,
}

impl OmieService {
    pub const ALL: [OmieService; 4] = [
        OmieService::Receivable,
        OmieService::Payable,
        OmieService::Clients,
        OmieService::Sales,
    ];

    /// Batch fetched by a regular dashboard sync.
    pub const DEFAULT_BATCH: [OmieService; 3] = [
        OmieService::Receivable,
        OmieService::Payable,
        OmieService::Clients,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            OmieService::Receivable => "Contas a Receber",
            OmieService::Payable => "Contas a Pagar",
            OmieService::Clients => "Clientes",
            OmieService::Sales => "Faturamento",
        }
    }

    /// Endpoint path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            OmieService::Receivable => "financas/contareceber/",
            OmieService::Payable => "financas/contapagar/",
            OmieService::Clients => "geral/clientes/",
            OmieService::Sales => "produtos/nfconsultar/",
        }
    }

    pub fn call(&self) -> &'static str {
        match self {
            OmieService::Receivable => "ListarContasReceber",
            OmieService::Payable => "ListarContasPagar",
            OmieService::Clients => "ListarClientes",
            OmieService::Sales => "ListarNFAutorizadas",
        }
    }

    /// Field of the listing response that carries the records.
    pub fn list_field(&self) -> &'static str {
        match self {
            OmieService::Receivable => "conta_receber_cadastro",
            OmieService::Payable => "conta_pagar_cadastro",
            OmieService::Clients => "clientes_cadastro",
            OmieService::Sales => "vendas_nf_autorizadas",
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            OmieService::Receivable => EntityKind::Receivables,
            OmieService::Payable => EntityKind::Payables,
            OmieService::Clients => EntityKind::Clients,
            OmieService::Sales => EntityKind::Sales,
        }
    }

    pub fn param(&self, page: u32, range: &DateRange) -> Value {
        match self {
            OmieService::Receivable => json!({
                "pagina": page,
                "registros_por_pagina": 50,
                "apenas_importado_api": "N",
                "filtrar_por_data_de": range.start_param(),
                "filtrar_por_data_ate": range.end_param(),
            }),
            OmieService::Payable => json!({
                "pagina": page,
                "registros_por_pagina": 50,
                "apenas_importado_api": "N",
                "dtVencDe": range.start_param(),
                "dtVencAte": range.end_param(),
            }),
            OmieService::Clients => json!({
                "pagina": page,
                "registros_por_pagina": 100,
                "apenas_importado_api": "N",
            }),
            OmieService::Sales => json!({
                "pagina": page,
                "registros_por_pagina": 50,
                "dRegInicial": range.start_param(),
                "dRegFinal": range.end_param(),
            }),
        }
    }

    pub fn request(&self, base_url: &str, page: u32, range: &DateRange) -> OmieRequest {
        OmieRequest {
            service: *self,
            endpoint: join_endpoint(base_url, self.path()),
            call: self.call().to_string(),
            param: self.param(page, range),
        }
    }
}

impl std::fmt::Display for OmieService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for OmieService {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RECEIVABLE" => Ok(OmieService::Receivable),
            "PAYABLE" => Ok(OmieService::Payable),
            "CLIENTS" => Ok(OmieService::Clients),
            "SALES" => Ok(OmieService::Sales),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown service '{}'",
                other
            ))),
        }
    }
}

/// Join an endpoint path onto a base URL. Absolute URLs are returned as-is.
pub fn join_endpoint(base_url: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
