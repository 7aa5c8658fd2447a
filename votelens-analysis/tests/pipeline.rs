mod common;

use async_trait::async_trait;
use common::ScriptedLlm;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use votelens_analysis::whatif::{answer_modes, resolve_modes};
use votelens_analysis::Analyzer;
use votelens_common::{AnalysisRequest, Facet, Result, VotelensError};
use votelens_web::{NewsHeadline, NewsSearch};

fn news_payload(neg: usize) -> Value {
    let item = |h: &str| json!({"headline": h, "source": "PTI", "date": "2025-01-02", "summary": "s", "sentiment_score": 0.1, "key_phrases": ["x"]});
    json!({
        "news": {
            "positive": (0..10).map(|i| item(&format!("p{i}"))).collect::<Vec<_>>(),
            "negative": (0..neg).map(|i| item(&format!("n{i}"))).collect::<Vec<_>>(),
            "neutral": (0..5).map(|i| item(&format!("u{i}"))).collect::<Vec<_>>(),
        },
        "summary": "coverage is mixed"
    })
}

struct FixedNews(Result<Vec<NewsHeadline>>);

#[async_trait]
impl NewsSearch for FixedNews {
    async fn headlines(&self, _query: &str, _limit: usize) -> Result<Vec<NewsHeadline>> {
        match &self.0 {
            Ok(h) => Ok(h.clone()),
            Err(_) => Err(VotelensError::Upstream("search down".into())),
        }
    }
}

#[tokio::test]
async fn fenced_reply_is_extracted_and_repaired() {
    let reply = "Here is the analysis:\n```json\n{\"regions\": [{\"name\": \"Patna\"}]}\n```";
    let llm = Arc::new(ScriptedLlm::replying(reply));
    let analyzer = Analyzer::new(llm.clone());

    let got = analyzer
        .run(Facet::Region, &AnalysisRequest::for_query("Bihar"))
        .await
        .unwrap();
    assert_eq!(got, json!({"regions": [{"name": "Patna"}], "summary": ""}));
    assert!(llm.last_prompt().unwrap().contains("Bihar"));
}

#[tokio::test]
async fn missing_subject_never_calls_the_model() {
    let llm = Arc::new(ScriptedLlm::new(vec![]));
    let analyzer = Analyzer::new(llm.clone());
    let err = analyzer
        .run(Facet::LeaderProfile, &AnalysisRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VotelensError::InvalidInput(ref m) if m == "name is required"));
    assert!(llm.last_prompt().is_none());
}

#[tokio::test]
async fn prose_only_reply_is_a_no_json_error() {
    let llm = Arc::new(ScriptedLlm::replying("Sorry, I cannot produce that."));
    let err = Analyzer::new(llm)
        .run(Facet::Caste, &AnalysisRequest::for_query("UP"))
        .await
        .unwrap_err();
    assert!(matches!(err, VotelensError::NoJson { .. }));
}

#[tokio::test]
async fn news_without_negative_bucket_fails_validation() {
    let mut payload = news_payload(10);
    payload["news"].as_object_mut().unwrap().remove("negative");
    let llm = Arc::new(ScriptedLlm::replying(&payload.to_string()));
    let err = Analyzer::new(llm)
        .run(Facet::News, &AnalysisRequest::for_query("Delhi"))
        .await
        .unwrap_err();
    assert!(matches!(err, VotelensError::Validation(_)));
}

#[tokio::test]
async fn short_negative_bucket_is_accepted() {
    let llm = Arc::new(ScriptedLlm::replying(&news_payload(7).to_string()));
    let got = Analyzer::new(llm)
        .run(Facet::News, &AnalysisRequest::for_query("Delhi"))
        .await
        .unwrap();
    assert_eq!(got["news"]["negative"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn grounding_headlines_reach_the_prompt() {
    let llm = Arc::new(ScriptedLlm::replying(&news_payload(10).to_string()));
    let news = Arc::new(FixedNews(Ok(vec![NewsHeadline {
        title: "Seat-sharing talks stall".into(),
        source: Some("NDTV".into()),
        date: None,
        link: None,
        snippet: None,
    }])));
    Analyzer::new(llm.clone())
        .with_news(news)
        .run(Facet::News, &AnalysisRequest::for_query("Bihar"))
        .await
        .unwrap();
    assert!(llm
        .last_prompt()
        .unwrap()
        .contains("Seat-sharing talks stall (NDTV)"));
}

#[tokio::test]
async fn failed_grounding_is_not_fatal() {
    let llm = Arc::new(ScriptedLlm::replying(&news_payload(10).to_string()));
    let news = Arc::new(FixedNews(Err(VotelensError::Upstream("x".into()))));
    let got = Analyzer::new(llm)
        .with_news(news)
        .run(Facet::News, &AnalysisRequest::for_query("Bihar"))
        .await;
    assert!(got.is_ok());
}

#[tokio::test]
async fn strategy_report_has_a_default_ceiling() {
    let llm = Arc::new(ScriptedLlm::replying("{}"));
    let analyzer = Analyzer::new(llm);
    assert_eq!(
        analyzer.timeout_for(Facet::StrategyReport),
        Some(Duration::from_secs(300))
    );
    assert_eq!(analyzer.timeout_for(Facet::Caste), None);
}

#[tokio::test]
async fn slow_model_hits_the_ceiling() {
    let llm = Arc::new(ScriptedLlm::replying("{}").slow(Duration::from_millis(500)));
    let err = Analyzer::new(llm)
        .with_timeout(Facet::StrategyReport, Duration::from_millis(20))
        .run(Facet::StrategyReport, &AnalysisRequest::for_query("TN"))
        .await
        .unwrap_err();
    assert!(matches!(err, VotelensError::Timeout(d) if d == Duration::from_millis(20)));
}

#[tokio::test]
async fn what_if_answers_every_mode() {
    let llm = ScriptedLlm::new(vec![
        Ok("best case".into()),
        Ok("likely case".into()),
        Ok("worst case".into()),
    ]);
    let modes = resolve_modes(None).unwrap();
    let answers = answer_modes(&llm, "What if turnout drops 5%?", &modes)
        .await
        .unwrap();
    assert_eq!(answers.len(), 3);
    let got_modes: Vec<_> = answers.iter().map(|a| a.mode.as_str()).collect();
    assert_eq!(got_modes, ["optimistic", "realistic", "pessimistic"]);
    let mut contents: Vec<_> = answers.iter().map(|a| a.content.as_str()).collect();
    contents.sort();
    assert_eq!(contents, ["best case", "likely case", "worst case"]);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let llm = ScriptedLlm::new(vec![]);
    let err = answer_modes(&llm, "   ", &resolve_modes(None).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, VotelensError::InvalidInput(_)));
}
