use crate::app::AppState;
use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use votelens_analysis::whatif::{answer_modes, resolve_modes};
use votelens_store::{Interaction, InteractionResponse};

const RECENT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
struct WhatIfBody {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    modes: Option<Vec<String>>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/what-if", post(what_if))
        .route("/api/recent", get(recent))
}

async fn what_if(
    State(state): State<AppState>,
    body: Result<Json<WhatIfBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Interaction>), ApiError> {
    let Json(body) = body?;
    let question = body.question.unwrap_or_default();
    let modes = resolve_modes(body.modes.as_deref())?;

    let answers = answer_modes(state.analyzer.llm().as_ref(), &question, &modes).await?;
    let responses = answers
        .into_iter()
        .map(|a| InteractionResponse {
            mode: a.mode,
            content: a.content,
        })
        .collect();

    let interaction = state.store.insert_interaction(&question, responses).await?;
    Ok((StatusCode::CREATED, Json(interaction)))
}

/// Newest first.
async fn recent(State(state): State<AppState>) -> Result<Json<Vec<Interaction>>, ApiError> {
    Ok(Json(state.store.recent_interactions(RECENT_LIMIT).await?))
}
