use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use votelens_analysis::Analyzer;
use votelens_app::{build_router, AppState};
use votelens_auth::{PasswordHasher, TokenService};
use votelens_common::{Result, VotelensError};
use votelens_config::ServerConfig;
use votelens_llm::traits::{LlmClient, LlmResponse};
use votelens_store::Store;

pub const SECRET: &str = "route-test-secret";
pub const DAY: Duration = Duration::from_secs(24 * 3600);

/// Model double: replays canned replies in order, optionally after a delay.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            delay: None,
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let text = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| VotelensError::Upstream("script exhausted".into()))?;
        Ok(LlmResponse {
            text,
            model: Some("scripted".into()),
            tokens_used: None,
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub tokens: TokenService,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new(llm: ScriptedLlm) -> Self {
        Self::with_analyzer(Analyzer::new(Arc::new(llm))).await
    }

    pub async fn with_analyzer(analyzer: Analyzer) -> Self {
        let store = Store::in_memory().await.unwrap();
        let tokens = TokenService::new(SECRET, DAY).unwrap();
        let mut state = AppState::new(analyzer, store.clone(), tokens.clone());
        state.hasher = PasswordHasher::new(4);
        Self {
            router: build_router(state, &ServerConfig::default()),
            store,
            tokens,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Raw value of the first `Set-Cookie` header.
#[allow(dead_code)]
pub fn set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
