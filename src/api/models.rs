//! Request and response bodies for the ledger HTTP API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::LedgerMetadata;

/// Body of `POST /ledgers`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateLedgerRequest {
    pub ledger_id: String,
}

/// One ledger as reported by the API
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LedgerView {
    pub ledger_id: String,
    pub status: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl LedgerView {
    pub fn from_metadata(ledger_id: impl Into<String>, metadata: &LedgerMetadata) -> Self {
        Self {
            ledger_id: ledger_id.into(),
            status: metadata.status().as_str().to_string(),
            created_at_ms: metadata.created_at_ms,
            updated_at_ms: metadata.updated_at_ms,
        }
    }
}

/// Body of `GET /ledgers`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerListResponse {
    pub ledgers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
