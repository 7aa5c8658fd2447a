//! Provider‑agnostic LLM integration for Votelens.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, concrete
//! provider implementations for OpenAI and Anthropic, and the [`json`]
//! normalizer that turns free‑form model output into a JSON value.
//!
//! # Examples
//! ```no_run
//! use votelens_common::{LlmConfig, Result};
//! use votelens_llm::{ensure_llm_ready, ClientTuning};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = LlmConfig::OpenAi {
//!     api_key: "sk-...".into(),
//!     model: "gpt-4o-mini".into(),
//!     base_url: None,
//! };
//! let client = ensure_llm_ready(&cfg, &ClientTuning::default())?;
//! assert_eq!(client.model_name(), "gpt-4o-mini");
//! # Ok(())
//! # }
//! ```
pub mod anthropic;
pub mod json;
pub mod openai;
pub mod traits;

use anthropic::AnthropicClient;
use openai::OpenAiClient;
use std::sync::Arc;
use std::time::Duration;
use traits::LlmClient;
use votelens_common::{LlmConfig, VotelensError};
use votelens_http::{HttpError, RetryPolicy};

pub use json::extract_json;
pub use traits::LlmResponse;

/// Transport knobs applied to every provider client.
#[derive(Debug, Clone, Copy)]
pub struct ClientTuning {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientTuning {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }
}

/// Build the client for the configured provider.
///
/// Construction is local; no network call is made.
pub fn ensure_llm_ready(
    config: &LlmConfig,
    tuning: &ClientTuning,
) -> votelens_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let mut client = OpenAiClient::new(api_key.clone(), model.clone())?;
            if let Some(url) = base_url {
                client = client.with_base_url(url)?;
            }
            Ok(Arc::new(client.with_tuning(tuning)))
        }
        LlmConfig::Anthropic {
            api_key,
            model,
            base_url,
        } => {
            let mut client = AnthropicClient::new(api_key.clone(), model.clone())?;
            if let Some(url) = base_url {
                client = client.with_base_url(url)?;
            }
            Ok(Arc::new(client.with_tuning(tuning)))
        }
        LlmConfig::None => Err(VotelensError::Config("No LLM configured".to_string())),
    }
}

pub(crate) fn http_to_votelens(provider: &str, e: HttpError) -> VotelensError {
    VotelensError::Upstream(format!("{provider}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_a_config_error() {
        let err = ensure_llm_ready(&LlmConfig::None, &ClientTuning::default())
            .err()
            .unwrap();
        assert!(matches!(err, VotelensError::Config(_)));
    }

    #[test]
    fn builds_each_provider() {
        let openai = LlmConfig::OpenAi {
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
            base_url: Some("http://127.0.0.1:9/v1".into()),
        };
        let anthropic = LlmConfig::Anthropic {
            api_key: "ak-test".into(),
            model: "claude-3-5-sonnet-20241022".into(),
            base_url: None,
        };
        let tuning = ClientTuning::default();
        assert_eq!(
            ensure_llm_ready(&openai, &tuning).unwrap().model_name(),
            "gpt-4o-mini"
        );
        assert_eq!(
            ensure_llm_ready(&anthropic, &tuning).unwrap().model_name(),
            "claude-3-5-sonnet-20241022"
        );
    }
}
