use super::types::{NewsResult, NewsResultsResponse};
use crate::{NewsHeadline, NewsSearch};
use async_trait::async_trait;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use votelens_common::{snippet, Result, VotelensError};
use votelens_http::{Auth, HttpClient, RequestOpts, RetryPolicy};

const SERPAPI_BASE: &str = "https://serpapi.com/";

/// Minimal client for the SerpAPI Google News engine.
#[derive(Clone)]
pub struct SerpApiClient {
    http: HttpClient,
    api_key: String,
    /// Country code passed as `gl`.
    country: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, SERPAPI_BASE)
    }

    pub fn with_base_url(api_key: String, base: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(VotelensError::Config("SERPAPI_KEY is not set".into()));
        }
        let http = HttpClient::new(base)
            .map_err(|e| VotelensError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(Duration::from_secs(20));
        Ok(Self {
            http,
            api_key,
            country: "in".into(),
        })
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub async fn search_news(&self, query: &str) -> Result<NewsResultsResponse> {
        let query_snippet = snippet(query, 160);
        let started = Instant::now();
        tracing::info!(target: "web.serpapi", query = %query_snippet, "serpapi.news.start");

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("engine", "google_news".into()),
            ("q", query.into()),
            ("gl", self.country.as_str().into()),
            ("hl", "en".into()),
        ];
        let resp: NewsResultsResponse = self
            .http
            .get_json(
                "search.json",
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "api_key",
                        value: Cow::Borrowed(self.api_key.as_str()),
                    }),
                    query: Some(params),
                    retry: Some(RetryPolicy::none()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| {
                tracing::warn!(
                    target: "web.serpapi",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "serpapi.news.error"
                );
                VotelensError::Upstream(format!("serpapi: {e}"))
            })?;

        if let Some(err) = resp.error.as_deref() {
            // "Google News hasn't returned any results" arrives as a 200 with `error`.
            tracing::info!(target: "web.serpapi", query = %query_snippet, error = %err, "serpapi.news.empty");
        }
        tracing::info!(
            target: "web.serpapi",
            query = %query_snippet,
            hits = resp.news_results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "serpapi.news.success"
        );
        Ok(resp)
    }
}

#[async_trait]
impl NewsSearch for SerpApiClient {
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<NewsHeadline>> {
        let resp = self.search_news(query).await?;
        Ok(flatten_results(&resp.news_results, limit))
    }
}

/// Flatten story clusters in display order, skipping untitled entries.
fn flatten_results(results: &[NewsResult], limit: usize) -> Vec<NewsHeadline> {
    let mut out = Vec::new();
    for r in results {
        if out.len() >= limit {
            break;
        }
        if let Some(h) = to_headline(r) {
            out.push(h);
        }
        for story in &r.stories {
            if out.len() >= limit {
                break;
            }
            if let Some(h) = to_headline(story) {
                out.push(h);
            }
        }
    }
    out
}

fn to_headline(r: &NewsResult) -> Option<NewsHeadline> {
    let title = r.title.as_deref()?.trim();
    if title.is_empty() {
        return None;
    }
    Some(NewsHeadline {
        title: title.to_string(),
        source: r.source.as_ref().map(|s| s.name().to_string()),
        date: r.date.clone(),
        link: r.link.clone(),
        snippet: r.snippet.clone(),
    })
}
