//! One POST endpoint per facet, all backed by [`Analyzer::run`].
//!
//! [`Analyzer::run`]: votelens_analysis::Analyzer::run

use crate::app::AppState;
use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use votelens_common::{AnalysisRequest, Facet};
use votelens_store::{NewReport, Report};

type Body = Result<Json<AnalysisRequest>, JsonRejection>;

pub fn router() -> Router<AppState> {
    let mut router = Router::new().route(Facet::Search.path(), post(search));
    for facet in Facet::ALL.into_iter().filter(|f| *f != Facet::Search) {
        router = router.route(
            facet.path(),
            post(move |State(state): State<AppState>, body: Body| run_facet(state, facet, body)),
        );
    }
    router
}

async fn run_facet(state: AppState, facet: Facet, body: Body) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let report = state.analyzer.run(facet, &request).await?;
    Ok(Json(report))
}

/// Full report; also saved so it can be shared by id until it expires.
async fn search(State(state): State<AppState>, body: Body) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let mut report = state.analyzer.run(Facet::Search, &request).await?;

    match save_report(&state, &request, &report).await {
        Ok(saved) => {
            if let Value::Object(map) = &mut report {
                map.insert("report_id".into(), json!(saved.id));
                map.insert("expires_at".into(), json!(saved.expires_at));
            }
        }
        Err(e) => tracing::warn!(error = %e, "api.search.report_not_saved"),
    }
    Ok(Json(report))
}

async fn save_report(
    state: &AppState,
    request: &AnalysisRequest,
    report: &Value,
) -> votelens_common::Result<Report> {
    let password_hash = match request.option_str("reportPassword") {
        Some(password) => Some(state.hasher.hash(password).await?),
        None => None,
    };
    let saved = state
        .store
        .insert_report(NewReport {
            query: request.subject(Facet::Search)?.to_string(),
            payload: report.clone(),
            password_hash,
            ttl: state.report_ttl,
        })
        .await?;
    tracing::info!(
        report_id = %saved.id,
        protected = saved.is_protected(),
        "api.search.report_saved"
    );
    Ok(saved)
}
