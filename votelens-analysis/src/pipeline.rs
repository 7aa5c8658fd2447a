use crate::facets::FacetSpec;
use crate::prompts::{build_prompt, Prompt};
use crate::repair::repair;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use votelens_common::{AnalysisRequest, Facet, Result, VotelensError};
use votelens_llm::json::extract_json_with_strategy;
use votelens_llm::traits::LlmClient;
use votelens_web::{NewsHeadline, NewsSearch};

const GROUNDING_HEADLINES: usize = 15;
const STRATEGY_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared facet pipeline: subject → grounding → prompt → LLM → JSON → repair.
#[derive(Clone)]
pub struct Analyzer {
    llm: Arc<dyn LlmClient + Send + Sync>,
    news: Option<Arc<dyn NewsSearch>>,
    temperature: Option<f32>,
    max_tokens_cap: Option<u32>,
    timeouts: BTreeMap<Facet, Duration>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        let mut timeouts = BTreeMap::new();
        timeouts.insert(Facet::StrategyReport, STRATEGY_TIMEOUT);
        Self {
            llm,
            news: None,
            temperature: Some(0.7),
            max_tokens_cap: None,
            timeouts,
        }
    }

    pub fn with_news(mut self, news: Arc<dyn NewsSearch>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Upper bound applied to every facet's token budget.
    pub fn with_max_tokens_cap(mut self, cap: u32) -> Self {
        self.max_tokens_cap = Some(cap);
        self
    }

    /// Ceiling for one facet's model call; replaces any earlier value.
    pub fn with_timeout(mut self, facet: Facet, ceiling: Duration) -> Self {
        self.timeouts.insert(facet, ceiling);
        self
    }

    pub fn timeout_for(&self, facet: Facet) -> Option<Duration> {
        self.timeouts.get(&facet).copied()
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient + Send + Sync> {
        &self.llm
    }

    /// Run `facet` for `request` and return the repaired JSON report.
    pub async fn run(&self, facet: Facet, request: &AnalysisRequest) -> Result<Value> {
        let started = Instant::now();
        let subject = request.subject(facet)?;
        let spec = FacetSpec::for_facet(facet);

        let headlines = if spec.grounded {
            self.grounding(subject, request).await
        } else {
            Vec::new()
        };
        let prompt = build_prompt(facet, subject, request, &headlines);
        let raw = self.complete(facet, spec, &prompt).await?;

        let (mut value, strategy) = extract_json_with_strategy(&raw).inspect_err(|_| {
            tracing::warn!(
                facet = %facet,
                raw_chars = raw.chars().count(),
                "analysis.facet.no_json"
            );
        })?;
        let report = repair(&mut value, &spec.rules()).inspect_err(|e| {
            tracing::warn!(facet = %facet, error = %e, "analysis.facet.invalid");
        })?;

        tracing::info!(
            facet = %facet,
            strategy = strategy.as_str(),
            grounded_headlines = headlines.len(),
            filled_keys = report.filled_keys.len(),
            filled_fields = report.filled_fields.len(),
            shortfalls = report.shortfalls.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis.facet.completed"
        );
        Ok(value)
    }

    async fn complete(&self, facet: Facet, spec: &FacetSpec, prompt: &Prompt) -> Result<String> {
        let max_tokens = match self.max_tokens_cap {
            Some(cap) => spec.max_tokens.min(cap),
            None => spec.max_tokens,
        };
        let call = self.llm.generate(
            &prompt.user,
            Some(&prompt.system),
            Some(max_tokens),
            self.temperature,
        );
        let resp = match self.timeout_for(facet) {
            Some(ceiling) => tokio::time::timeout(ceiling, call).await.map_err(|_| {
                tracing::warn!(
                    facet = %facet,
                    timeout_ms = ceiling.as_millis() as u64,
                    "analysis.facet.timeout"
                );
                VotelensError::Timeout(ceiling)
            })??,
            None => call.await?,
        };
        Ok(resp.text)
    }

    /// Best-effort headlines; failures are logged and yield none.
    async fn grounding(&self, subject: &str, request: &AnalysisRequest) -> Vec<NewsHeadline> {
        let Some(news) = &self.news else {
            return Vec::new();
        };
        let query = match request.region() {
            Some(region) if !subject.contains(region) => format!("{subject} {region}"),
            _ => subject.to_string(),
        };
        match news.headlines(&query, GROUNDING_HEADLINES).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "analysis.grounding.failed");
                Vec::new()
            }
        }
    }
}
