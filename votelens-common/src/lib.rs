//! Common types and utilities shared across Votelens crates.
//!
//! This crate defines the analytic facet catalogue, the per-call request
//! shape, observability helpers, and the shared error type used throughout
//! the workspace. It stays lightweight so every crate can depend on it.
//!
//! # Overview
//!
//! - [`Facet`]: one independently fetched analytic report
//! - [`AnalysisRequest`]: the JSON body every facet endpoint accepts
//! - [`LlmConfig`]: provider-agnostic LLM configuration
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`VotelensError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use votelens_common::{AnalysisRequest, Facet};
//!
//! let req = AnalysisRequest::for_query("Bihar assembly election");
//! assert_eq!(req.subject(Facet::Sentiment).unwrap(), "Bihar assembly election");
//! assert_eq!(Facet::LeaderProfile.path(), "/api/leader-profile");
//! ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod facet;
pub mod observability;
pub mod request;

pub use facet::{Facet, SubjectField};
pub use request::AnalysisRequest;

/// Maximum number of characters of raw model output carried in errors.
pub const RAW_SNIPPET_CHARS: usize = 500;

/// Configuration for the LLM provider used by the analytics pipeline.
///
/// See the `votelens-llm` crate for the concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LlmConfig {
    OpenAi {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::None
    }
}

/// Error types used across the Votelens system.
#[derive(thiserror::Error, Debug)]
pub enum VotelensError {
    /// The caller sent a request that is missing required data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upstream provider (LLM, search) failed or was unreachable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model output could not be turned into JSON by any extraction strategy.
    #[error("No valid JSON found in model output")]
    NoJson { snippet: String },

    /// Model output parsed but failed a hard structural check.
    #[error("Response validation failed: {0}")]
    Validation(String),

    /// Operation exceeded its ceiling.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence layer reported an error.
    #[error("Storage error: {0}")]
    Store(String),

    /// A referenced record does not exist (or has expired).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials or session token were missing or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`VotelensError`].
pub type Result<T> = std::result::Result<T, VotelensError>;

/// Truncate `raw` to at most `max_chars` characters, appending `...` when cut.
///
/// ```
/// use votelens_common::snippet;
///
/// assert_eq!(snippet("héllo world", 5), "héllo...");
/// assert_eq!(snippet("short", 10), "short");
/// ```
pub fn snippet(raw: &str, max_chars: usize) -> String {
    match raw.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}
