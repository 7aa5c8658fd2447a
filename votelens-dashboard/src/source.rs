use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use votelens_common::{AnalysisRequest, Facet, Result, VotelensError};
use votelens_http::{HttpClient, HttpError, RequestOpts, RetryPolicy};

/// Where facet results come from.
#[async_trait]
pub trait FacetSource: Send + Sync {
    async fn fetch(&self, facet: Facet, request: &AnalysisRequest) -> Result<Value>;
}

/// Calls a running Votelens server, one POST per facet, no retries.
#[derive(Clone)]
pub struct HttpFacetSource {
    http: HttpClient,
}

impl HttpFacetSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = HttpClient::new(base_url)
            .map_err(|e| VotelensError::Config(format!("invalid server url: {e}")))?
            .with_timeout(Duration::from_secs(330))
            .with_retry_policy(RetryPolicy::none());
        Ok(Self { http })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl FacetSource for HttpFacetSource {
    async fn fetch(&self, facet: Facet, request: &AnalysisRequest) -> Result<Value> {
        self.http
            .post_json_opts(facet.path(), request, RequestOpts::default())
            .await
            .map_err(|e| match e {
                HttpError::Api { status, message, .. } => {
                    VotelensError::Upstream(format!("{facet}: {status}: {message}"))
                }
                other => VotelensError::Upstream(format!("{facet}: {other}")),
            })
    }
}
