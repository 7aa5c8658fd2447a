//! Scenario ("what if") answers, one prose answer per perspective.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use votelens_common::{Result, VotelensError};
use votelens_llm::traits::LlmClient;

pub const DEFAULT_MODES: [&str; 3] = ["optimistic", "realistic", "pessimistic"];
const MAX_MODES: usize = 6;
const ANSWER_TOKENS: u32 = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeAnswer {
    pub mode: String,
    pub content: String,
}

fn mode_instruction(mode: &str) -> String {
    match mode {
        "optimistic" => "Describe the best plausible outcome and what would have to go right.".into(),
        "realistic" => "Describe the most likely outcome given current evidence.".into(),
        "pessimistic" => "Describe the worst plausible outcome and the warning signs to watch.".into(),
        other => format!("Answer from a {other} perspective."),
    }
}

/// Normalise requested modes: trimmed, lowercased, deduplicated, defaulted.
pub fn resolve_modes(requested: Option<&[String]>) -> Result<Vec<String>> {
    let mut modes: Vec<String> = Vec::new();
    for m in requested.unwrap_or_default() {
        let m = m.trim().to_ascii_lowercase();
        if !m.is_empty() && !modes.contains(&m) {
            modes.push(m);
        }
    }
    if modes.is_empty() {
        modes = DEFAULT_MODES.iter().map(|m| m.to_string()).collect();
    }
    if modes.len() > MAX_MODES {
        return Err(VotelensError::InvalidInput(format!(
            "at most {MAX_MODES} modes are supported"
        )));
    }
    Ok(modes)
}

/// Answer `question` once per mode, concurrently. Any failure fails the set.
pub async fn answer_modes(
    llm: &(dyn LlmClient + Send + Sync),
    question: &str,
    modes: &[String],
) -> Result<Vec<ModeAnswer>> {
    let question = question.trim();
    if question.is_empty() {
        return Err(VotelensError::InvalidInput("question is required".into()));
    }
    let system = format!(
        "{}\n\nAnswer in plain prose of at most three short paragraphs. Do not use JSON or markdown headings.",
        llm.default_analyst_system_prompt()
    );
    let calls = modes.iter().map(|mode| {
        let prompt = format!(
            "Scenario question: {question}\n\nPerspective: {mode}\n{}",
            mode_instruction(mode)
        );
        let system = system.as_str();
        async move {
            let resp = llm
                .generate(&prompt, Some(system), Some(ANSWER_TOKENS), Some(0.8))
                .await?;
            Ok::<_, VotelensError>(ModeAnswer {
                mode: mode.clone(),
                content: resp.text.trim().to_string(),
            })
        }
    });
    let answers = try_join_all(calls).await?;
    tracing::info!(modes = answers.len(), "analysis.what_if.completed");
    Ok(answers)
}
