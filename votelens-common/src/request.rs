use crate::{Facet, Result, SubjectField, VotelensError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body accepted by every facet endpoint. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

impl AnalysisRequest {
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_time_range(mut self, time_range: impl Into<String>) -> Self {
        self.time_range = Some(time_range.into());
        self
    }

    /// Resolve the subject of the analysis for `facet`.
    ///
    /// Person-centric facets read `name` first; everything else reads `query`
    /// first. Either falls back to the other field. Blank values count as absent.
    pub fn subject(&self, facet: Facet) -> Result<&str> {
        let query = non_blank(self.query.as_deref());
        let name = non_blank(self.name.as_deref());
        let (primary, fallback, label) = match facet.subject_field() {
            SubjectField::Query => (query, name, "query"),
            SubjectField::Name => (name, query, "name"),
        };
        primary
            .or(fallback)
            .ok_or_else(|| VotelensError::InvalidInput(format!("{label} is required")))
    }

    pub fn region(&self) -> Option<&str> {
        non_blank(self.region.as_deref())
    }

    pub fn time_range(&self) -> Option<&str> {
        non_blank(self.time_range.as_deref())
    }

    /// String value of `options.<key>`, if present and non-blank.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        let raw = self.options.as_ref()?.get(key)?.as_str();
        non_blank(raw)
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}
