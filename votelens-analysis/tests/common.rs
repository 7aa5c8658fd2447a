use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use votelens_common::{Result, VotelensError};
use votelens_llm::traits::{LlmClient, LlmResponse};

/// LLM double that replays canned replies and records prompts.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String>>>,
    pub prompts: Mutex<Vec<String>>,
    pub delay: Option<Duration>,
}

#[allow(dead_code)]
impl ScriptedLlm {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(VotelensError::Upstream("script exhausted".into())))?;
        Ok(LlmResponse {
            text: next,
            model: Some("scripted".into()),
            tokens_used: None,
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
