use crate::traits::{LlmClient, LlmResponse};
use crate::{http_to_votelens, ClientTuning};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use votelens_common::{Result, VotelensError};
use votelens_http::{Auth, HttpClient, RequestOpts};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1/";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The messages API requires `max_tokens`.
const FALLBACK_MAX_TOKENS: u32 = 4000;

pub struct AnthropicClient {
    client: HttpClient,
    api_key: HeaderValue,
    model: String,
}

#[derive(Serialize)]
pub struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
pub struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let trimmed = api_key.trim();
        if trimmed.is_empty() {
            return Err(VotelensError::Config("ANTHROPIC_API_KEY is not set".into()));
        }
        let mut api_key = HeaderValue::from_str(trimmed)
            .map_err(|e| VotelensError::Config(format!("invalid Anthropic API key: {e}")))?;
        api_key.set_sensitive(true);
        let client = HttpClient::new(ANTHROPIC_API_BASE)
            .map_err(|e| VotelensError::Config(format!("HttpClient init failed: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let fresh = HttpClient::new(base)
            .map_err(|e| VotelensError::Config(format!("invalid Anthropic endpoint: {e}")))?;
        self.client = fresh
            .with_timeout(self.client.default_timeout)
            .with_retry_policy(self.client.retry);
        Ok(self)
    }

    pub fn with_tuning(mut self, tuning: &ClientTuning) -> Self {
        self.client = self
            .client
            .with_timeout(tuning.timeout)
            .with_retry_policy(tuning.retry);
        self
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let req = MessagesRequest {
            model: &self.model,
            max_tokens: max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            system: system_prompt.unwrap_or_else(|| self.default_analyst_system_prompt()),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            max_tokens = req.max_tokens,
            "llm.anthropic.generate"
        );

        let resp: MessagesResponse = self
            .client
            .post_json_opts(
                "messages",
                &req,
                RequestOpts {
                    headers: Some(headers),
                    auth: Some(Auth::Header {
                        name: HeaderName::from_static("x-api-key"),
                        value: self.api_key.clone(),
                    }),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| http_to_votelens("anthropic", e))?;

        let text = resp
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| VotelensError::Upstream("anthropic: response had no text block".into()))?;

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used: resp.usage.map(|u| u.input_tokens + u.output_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
