//! Turn free-form model output into a JSON value.
//!
//! Models often wrap their JSON in markdown fences or surround it with
//! prose. [`extract_json`] tries three strategies in strict order and stops
//! at the first that yields syntactically valid JSON:
//!
//! 1. parse the trimmed text as-is;
//! 2. parse the interior of the first ```` ```json ```` block, then of the
//!    first fenced block of any kind;
//! 3. parse the widest `{...}` or `[...]` span, leftmost opener first.
//!
//! Only syntax is guaranteed; shape checks belong to the repair rules.
//!
//! ```
//! use serde_json::json;
//! use votelens_llm::json::extract_json;
//!
//! let raw = "Here you go:\n```json\n{\"summary\": \"ok\"}\n```\nThanks!";
//! assert_eq!(extract_json(raw).unwrap(), json!({"summary": "ok"}));
//! ```
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use votelens_common::{snippet, Result, VotelensError, RAW_SNIPPET_CHARS};

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn json_fence_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?s)```(?:json|JSON)[ \t]*\r?\n?(.*?)\s*```")
}

fn any_fence_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)\s*```")
}

fn object_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?s)\{.*\}")
}

fn array_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?s)\[.*\]")
}

/// Which strategy produced the value; logged by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Fenced,
    Span,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Fenced => "fenced",
            Strategy::Span => "span",
        }
    }
}

/// Extract the first JSON value from `raw`.
///
/// Fails with [`VotelensError::NoJson`] carrying the first
/// [`RAW_SNIPPET_CHARS`] characters of the input.
pub fn extract_json(raw: &str) -> Result<Value> {
    extract_json_with_strategy(raw).map(|(value, _)| value)
}

/// Same as [`extract_json`], also reporting which strategy matched.
pub fn extract_json_with_strategy(raw: &str) -> Result<(Value, Strategy)> {
    let trimmed = raw.trim();

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Ok((v, Strategy::Direct));
    }

    for re in [json_fence_re(), any_fence_re()].into_iter().flatten() {
        let Some(interior) = re.captures(trimmed).and_then(|c| c.get(1)) else {
            continue;
        };
        if let Ok(v) = serde_json::from_str::<Value>(interior.as_str().trim()) {
            return Ok((v, Strategy::Fenced));
        }
    }

    // Leftmost opener wins; the other bracket kind is a second chance.
    let mut spans: Vec<_> = [object_re(), array_re()]
        .into_iter()
        .flatten()
        .filter_map(|re| re.find(trimmed))
        .collect();
    spans.sort_by_key(|m| m.start());
    for span in spans {
        if let Ok(v) = serde_json::from_str::<Value>(span.as_str()) {
            return Ok((v, Strategy::Span));
        }
    }

    tracing::debug!(raw_chars = raw.chars().count(), "llm.json.no_json");
    Err(VotelensError::NoJson {
        snippet: snippet(raw, RAW_SNIPPET_CHARS),
    })
}
