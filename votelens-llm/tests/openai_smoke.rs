//! Live call against OpenAI. Run with `--features e2e` and `OPENAI_API_KEY` set.
#![cfg(feature = "e2e")]

mod common;
use votelens_common::Result;
use votelens_llm::openai::OpenAiClient;
use votelens_llm::traits::LlmClient;

const MODEL: &str = "gpt-4o-mini";

fn make_client_or_skip() -> OpenAiClient {
    let key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        tracing::debug!("Skipping: OPENAI_API_KEY not set");

        panic!("SKIP");
    });

    OpenAiClient::new(key, MODEL.to_string()).expect("should work")
}

#[tokio::test]
async fn openai_generate_smoketest() -> Result<()> {
    common::init_test_tracing();
    let client = make_client_or_skip();

    let response = client
        .generate("Reply with {\"ok\": true}", None, Some(16), Some(0.0))
        .await?;
    tracing::debug!("OpenAi response is: {}", response.text);

    let value = votelens_llm::extract_json(&response.text)?;
    assert!(value.is_object(), "expected an object, got {value}");
    Ok(())
}
