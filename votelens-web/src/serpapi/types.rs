use serde::Deserialize;

/// Subset of the `google_news` engine response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewsResultsResponse {
    #[serde(default)]
    pub news_results: Vec<NewsResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<NewsSource>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Story clusters nest their articles here.
    #[serde(default)]
    pub stories: Vec<NewsResult>,
}

/// `source` is a bare string on some result shapes and an object on others.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NewsSource {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        icon: Option<String>,
    },
}

impl NewsSource {
    pub fn name(&self) -> &str {
        match self {
            NewsSource::Name(n) => n,
            NewsSource::Detailed { name, .. } => name,
        }
    }
}
