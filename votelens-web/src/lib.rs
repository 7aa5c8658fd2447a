//! News discovery used to ground analytic prompts.
//!
//! - [`NewsSearch`]: the seam the analysis pipeline depends on
//! - [`serpapi`]: SerpAPI Google News client (`SERPAPI_KEY`)
//!
//! Grounding is best-effort; callers log and continue when a search fails.

pub mod serpapi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use votelens_common::Result;

/// One news hit, trimmed to what prompts embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub title: String,
    pub source: Option<String>,
    pub date: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl NewsHeadline {
    /// Single prompt line: `title (source, date)`.
    pub fn prompt_line(&self) -> String {
        match (self.source.as_deref(), self.date.as_deref()) {
            (Some(s), Some(d)) => format!("{} ({s}, {d})", self.title),
            (Some(s), None) => format!("{} ({s})", self.title),
            (None, Some(d)) => format!("{} ({d})", self.title),
            (None, None) => self.title.clone(),
        }
    }
}

#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Up to `limit` recent headlines for `query`.
    async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<NewsHeadline>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_line_includes_known_parts() {
        let mut h = NewsHeadline {
            title: "Turnout rises in Patna".into(),
            source: Some("The Hindu".into()),
            date: Some("2024-05-01".into()),
            link: None,
            snippet: None,
        };
        assert_eq!(h.prompt_line(), "Turnout rises in Patna (The Hindu, 2024-05-01)");
        h.date = None;
        assert_eq!(h.prompt_line(), "Turnout rises in Patna (The Hindu)");
        h.source = None;
        assert_eq!(h.prompt_line(), "Turnout rises in Patna");
    }
}
