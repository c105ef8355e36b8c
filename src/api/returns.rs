use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{AccountName, ReturnRecord};
use crate::engine::{SkippedPeriod, Window};
use crate::error::AppError;

fn parse_account(input: &str) -> Result<AccountName, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > 128 {
        return Err(AppError::BadRequest("Invalid account name".to_string()));
    }
    Ok(AccountName::new(trimmed))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResponse {
    pub records: Vec<ReturnRecord>,
    pub skipped: Vec<SkippedPeriod>,
    pub widen_exhausted: bool,
}

/// Run the engine for one account. The body is a `Window`:
/// `{"mode":"fixed","start":...,"end":...}`, `{"mode":"continue_from_last"}`,
/// or `{"mode":"continue_to_date","end":...}`.
pub async fn compute_returns(
    Path(account): Path<String>,
    State(state): State<AppState>,
    Json(window): Json<Window>,
) -> Result<Json<ComputeResponse>, AppError> {
    let account = parse_account(&account)?;

    let report = state.engine.compute_returns(&account, window).await?;

    Ok(Json(ComputeResponse {
        records: report.records,
        skipped: report.skipped,
        widen_exhausted: report.widen_exhausted,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub records: Vec<ReturnRecord>,
}

/// Most recent persisted return records for an account, newest first.
pub async fn list_returns(
    Path(account): Path<String>,
    Query(params): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, AppError> {
    let account = parse_account(&account)?;
    let limit = params.limit.unwrap_or(50).min(500);

    let records = state.store.recent_returns(&account, limit).await?;
    Ok(Json(ListResponse { records }))
}
