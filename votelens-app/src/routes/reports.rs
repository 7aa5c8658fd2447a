use crate::app::AppState;
use crate::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use votelens_store::Report;

#[derive(Debug, Deserialize)]
struct ReportQuery {
    #[serde(default)]
    password: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/reports/:id", get(get_report))
}

/// Expired and unknown ids are indistinguishable to the caller.
async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, ApiError> {
    let missing = || ApiError::not_found("Report not found or expired");
    let id = Uuid::parse_str(&id).map_err(|_| missing())?;
    let report = state.store.get_report(id).await?.ok_or_else(missing)?;

    if let Some(hash) = report.password_hash.as_deref() {
        let Some(password) = query.password.as_deref().filter(|p| !p.is_empty()) else {
            return Err(ApiError::unauthorized("Password required"));
        };
        if !state.hasher.verify(password, hash).await? {
            tracing::info!(report_id = %id, "api.report.bad_password");
            return Err(ApiError::unauthorized("Invalid password"));
        }
    }
    Ok(Json(report))
}
