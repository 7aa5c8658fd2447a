mod common;

use serde_json::json;
use std::time::Duration;
use votelens_common::VotelensError;
use votelens_http::RetryPolicy;
use votelens_llm::anthropic::AnthropicClient;
use votelens_llm::openai::OpenAiClient;
use votelens_llm::traits::LlmClient;
use votelens_llm::ClientTuning;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_tuning(retries: usize) -> ClientTuning {
    ClientTuning {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: false,
        },
    }
}

#[tokio::test]
async fn openai_chat_completion_wire_format() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 4000,
            "messages": [
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "analyse Bihar"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"summary\":\"ok\"}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new("sk-test".into(), "gpt-4o-mini".into())
        .unwrap()
        .with_base_url(&format!("{}/v1", server.uri()))
        .unwrap()
        .with_tuning(&quick_tuning(0));
    let resp = client
        .generate("analyse Bihar", Some("be terse"), Some(4000), Some(0.7))
        .await
        .unwrap();
    assert_eq!(resp.text, "{\"summary\":\"ok\"}");
    assert_eq!(resp.tokens_used, Some(15));
}

#[tokio::test]
async fn anthropic_messages_wire_format() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-20241022",
            "max_tokens": 8000,
            "system": "be terse",
            "messages": [{"role": "user", "content": "analyse Patna"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "model": "claude-3-5-sonnet-20241022",
            "content": [{"type": "text", "text": "```json\n{\"a\":1}\n```"}],
            "usage": {"input_tokens": 7, "output_tokens": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new("ak-test".into(), "claude-3-5-sonnet-20241022".into())
        .unwrap()
        .with_base_url(&format!("{}/v1", server.uri()))
        .unwrap()
        .with_tuning(&quick_tuning(0));
    let resp = client
        .generate("analyse Patna", Some("be terse"), Some(8000), None)
        .await
        .unwrap();
    assert_eq!(resp.text, "```json\n{\"a\":1}\n```");
    assert_eq!(resp.tokens_used, Some(10));
}

#[tokio::test]
async fn rate_limits_are_retried_by_the_transport() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "OK"}}]
        })))
        .mount(&server)
        .await;

    let client = OpenAiClient::new("sk-test".into(), "gpt-4o-mini".into())
        .unwrap()
        .with_base_url(&format!("{}/v1", server.uri()))
        .unwrap()
        .with_tuning(&quick_tuning(1));
    let resp = client.generate("ping", None, None, None).await.unwrap();
    assert_eq!(resp.text, "OK");
}

#[tokio::test]
async fn auth_failures_surface_as_upstream_errors() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new("ak-bad".into(), "claude-3-5-sonnet-20241022".into())
        .unwrap()
        .with_base_url(&format!("{}/v1", server.uri()))
        .unwrap()
        .with_tuning(&quick_tuning(2));
    let err = client.generate("ping", None, None, None).await.unwrap_err();
    match err {
        VotelensError::Upstream(msg) => assert!(msg.contains("invalid x-api-key"), "{msg}"),
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn empty_keys_are_configuration_errors() {
    assert!(matches!(
        OpenAiClient::new("  ".into(), "gpt-4o-mini".into()),
        Err(VotelensError::Config(_))
    ));
    assert!(matches!(
        AnthropicClient::new(String::new(), "claude".into()),
        Err(VotelensError::Config(_))
    ));
}
