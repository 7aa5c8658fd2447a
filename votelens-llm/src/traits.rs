use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use votelens_common::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// System prompt used when a caller does not supply one.
    fn default_analyst_system_prompt(&self) -> &str {
        r#"You are an expert political analyst covering Indian elections, with deep knowledge of voter behaviour, caste and community dynamics, regional issues, and campaign strategy.

Guidelines:
- Ground every claim in plausible, verifiable context
- Prefer specific numbers, names, and places over generalities
- Keep assessments balanced across parties
- Respond with valid JSON only when a JSON structure is requested"#
    }
}
