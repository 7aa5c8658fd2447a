//! Dashboard fan-out: one request per facet, merged once all settle.
//!
//! A failing facet never fails the dashboard; it is recorded in
//! [`DashboardState::errors`] and the rest of the view still renders.

mod source;

pub use source::{FacetSource, HttpFacetSource};

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use votelens_common::{AnalysisRequest, Facet};

/// Merged view-model keyed by facet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub facets: BTreeMap<Facet, Value>,
    pub errors: BTreeMap<Facet, String>,
    pub error_count: usize,
}

impl DashboardState {
    pub fn get(&self, facet: Facet) -> Option<&Value> {
        self.facets.get(&facet)
    }
}

#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn FacetSource>,
    facets: Vec<Facet>,
}

impl Aggregator {
    /// Aggregate every facet in [`Facet::ALL`].
    pub fn new(source: Arc<dyn FacetSource>) -> Self {
        Self {
            source,
            facets: Facet::ALL.to_vec(),
        }
    }

    pub fn with_facets(mut self, facets: impl IntoIterator<Item = Facet>) -> Self {
        self.facets = facets.into_iter().collect();
        self
    }

    /// Fetch all facets concurrently and merge whatever succeeded.
    pub async fn fetch_all(&self, request: &AnalysisRequest) -> DashboardState {
        let started = Instant::now();
        let calls = self.facets.iter().map(|&facet| {
            let source = Arc::clone(&self.source);
            async move { (facet, source.fetch(facet, request).await) }
        });
        let settled = join_all(calls).await;

        let mut state = DashboardState::default();
        for (facet, outcome) in settled {
            match outcome {
                Ok(value) => {
                    state.facets.insert(facet, value);
                }
                Err(e) => {
                    tracing::warn!(facet = %facet, error = %e, "dashboard.facet.failed");
                    state.errors.insert(facet, e.to_string());
                }
            }
        }
        state.error_count = state.errors.len();
        tracing::info!(
            ok = state.facets.len(),
            failed = state.error_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dashboard.fetch_all.settled"
        );
        state
    }
}
