mod common;

use serde_json::json;
use skimmer_common::SkimmerError;
use skimmer_llm::openai::OpenAiClient;
use skimmer_llm::{ConversationHandle, GenerateOptions, LlmClient};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn reply(id: &str, text: &str) -> serde_json::Value {
    json!({
        "id": id,
        "object": "response",
        "status": "completed",
        "model": "gpt-4.1-nano-2025-04-14",
        "output": [{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text, "annotations": []}]
        }],
        "usage": {"input_tokens": 10, "output_tokens": 3, "total_tokens": 13}
    })
}

async fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(Some("sk-test".into()), "gpt-4.1-nano".into())
        .unwrap()
        .with_base_url(&format!("{}/v1", server.uri()))
        .unwrap()
}

#[tokio::test]
async fn sends_instructions_and_returns_response_id_as_handle() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-nano",
            "input": "latest rust release",
            "instructions": "summarize"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("resp_abc", "Rust 1.90 shipped.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let resp = client
        .generate("latest rust release", Some("summarize"), GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(resp.text, "Rust 1.90 shipped.");
    assert_eq!(resp.conversation, Some(ConversationHandle::openai("resp_abc")));
}

#[tokio::test]
async fn threads_previous_response_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            let prev = body
                .get("previous_response_id")
                .and_then(|v| v.as_str())
                .unwrap_or("none")
                .to_string();
            ResponseTemplate::new(200).set_body_json(reply("resp_next", &prev))
        })
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let handle = ConversationHandle::openai("resp_prev");
    let opts = GenerateOptions {
        conversation: Some(&handle),
    };
    let continued = client.generate("and then?", None, opts).await.unwrap();
    assert_eq!(continued.text, "resp_prev");

    let foreign = ConversationHandle::ollama(vec![1, 2]);
    let opts = GenerateOptions {
        conversation: Some(&foreign),
    };
    let fresh = client.generate("and then?", None, opts).await.unwrap();
    assert_eq!(fresh.text, "none");
}

#[tokio::test]
async fn upstream_error_maps_to_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .generate("hi", None, GenerateOptions::default())
        .await
        .unwrap_err();

    match err {
        SkimmerError::Provider(msg) => assert!(msg.contains("Incorrect API key provided")),
        other => panic!("unexpected error: {other:?}"),
    }
}
