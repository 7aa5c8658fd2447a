use crate::error::ApiError;
use crate::gate::gate_layer;
use crate::routes;
use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use votelens_analysis::Analyzer;
use votelens_auth::{PasswordHasher, TokenService};
use votelens_common::Facet;
use votelens_config::{ServerConfig, VotelensConfig};
use votelens_http::RetryPolicy;
use votelens_llm::{ensure_llm_ready, ClientTuning};
use votelens_store::Store;
use votelens_web::serpapi::SerpApiClient;

const DEFAULT_REPORT_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Session cookie attributes.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    /// Set the `Secure` attribute (production only).
    pub secure: bool,
    pub max_age: Duration,
}

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub store: Store,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub cookie: CookieSettings,
    pub report_ttl: Duration,
}

impl AppState {
    /// State with development defaults: cookie `token`, not `Secure`,
    /// max-age equal to the token lifetime.
    pub fn new(analyzer: Analyzer, store: Store, tokens: TokenService) -> Self {
        let cookie = CookieSettings {
            name: "token".into(),
            secure: false,
            max_age: tokens.ttl(),
        };
        Self {
            analyzer,
            store,
            tokens,
            hasher: PasswordHasher::default(),
            cookie,
            report_ttl: DEFAULT_REPORT_TTL,
        }
    }

    /// Wire every dependency from configuration.
    pub async fn from_config(cfg: &VotelensConfig) -> anyhow::Result<Self> {
        let llm_config = cfg.llm_config().context("LLM provider is not configured")?;
        let tuning = ClientTuning {
            timeout: cfg.llm.request_timeout(),
            retry: RetryPolicy::default().with_max_retries(cfg.llm.max_retries),
        };
        let llm = ensure_llm_ready(&llm_config, &tuning)?;
        tracing::info!(model = llm.model_name(), "app.llm.ready");

        let mut analyzer = Analyzer::new(llm).with_temperature(cfg.llm.temperature);
        if let Some(cap) = cfg.llm.max_tokens {
            analyzer = analyzer.with_max_tokens_cap(cap);
        }
        for facet in Facet::ALL {
            if let Some(ceiling) = cfg.analysis.timeout_for(facet) {
                analyzer = analyzer.with_timeout(facet, ceiling);
            }
        }
        match cfg.serpapi.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let news = SerpApiClient::new(key.to_string())?;
                analyzer = analyzer.with_news(Arc::new(news));
            }
            _ => tracing::info!("app.grounding.disabled"),
        }

        let store = Store::shared(&cfg.database.url, cfg.database.max_connections).await?;
        let tokens = TokenService::new(cfg.auth.require_jwt_secret()?, cfg.auth.token_ttl())?;

        Ok(Self {
            analyzer,
            store,
            hasher: PasswordHasher::new(cfg.auth.bcrypt_cost),
            cookie: CookieSettings {
                name: cfg.auth.cookie_name.clone(),
                secure: cfg.server.is_production(),
                max_age: tokens.ttl(),
            },
            tokens,
            report_ttl: cfg.analysis.report_ttl(),
        })
    }
}

/// Assemble the application router.
///
/// Non-API paths fall through to `server.static_dir` when set. CORS is only
/// enabled when `server.public_url` names a browser origin.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .merge(routes::facets::router())
        .merge(routes::auth::router())
        .merge(routes::history::router())
        .merge(routes::reports::router());

    router = match &server.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    let mut router = router.layer(middleware::from_fn_with_state(state.clone(), gate_layer));
    if let Some(cors) = server.public_url.as_deref().and_then(cors_layer) {
        router = router.layer(cors);
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(public_url: &str) -> Option<CorsLayer> {
    let origin = match HeaderValue::from_str(public_url.trim().trim_end_matches('/')) {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(public_url, error = %e, "app.cors.invalid_origin");
            return None;
        }
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("No such route")
}
