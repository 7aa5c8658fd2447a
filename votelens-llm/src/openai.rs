use crate::traits::{LlmClient, LlmResponse};
use crate::{http_to_votelens, ClientTuning};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use votelens_common::{Result, VotelensError};
use votelens_http::{Auth, HttpClient, RequestOpts};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(VotelensError::Config("OPENAI_API_KEY is not set".into()));
        }
        let client = HttpClient::new(OPENAI_API_BASE)
            .map_err(|e| VotelensError::Config(format!("HttpClient init failed: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Point the client at an OpenAI-compatible gateway.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let fresh = HttpClient::new(base)
            .map_err(|e| VotelensError::Config(format!("invalid OpenAI endpoint: {e}")))?;
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
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let system = system_prompt.unwrap_or_else(|| self.default_analyst_system_prompt());
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            max_tokens = ?max_tokens,
            "llm.openai.generate"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json_opts(
                "chat/completions",
                &req,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| http_to_votelens("openai", e))?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VotelensError::Upstream("openai: response had no choices".into()))?;

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
