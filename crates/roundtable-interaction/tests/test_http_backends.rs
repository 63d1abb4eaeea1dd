use mockito::Matcher;
use roundtable_core::backend::{BackendError, ChatMessage, ModelBackend};
use roundtable_core::participant::{ModelBinding, ModelProvider};
use roundtable_interaction::{OllamaBackend, OpenAiCompatibleBackend, ProviderRouter};
use serde_json::json;

fn binding(provider: ModelProvider, model: &str, endpoint: String) -> ModelBinding {
    let mut binding = ModelBinding::new(provider, model);
    binding.endpoint = Some(endpoint);
    binding
}

#[tokio::test]
async fn test_ollama_chat_posts_non_streaming_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3",
            "stream": false,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hi"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":{"role":"assistant","content":"Hello there"},"done":true}"#)
        .create_async()
        .await;

    let mut b = binding(ModelProvider::Ollama, "llama3", server.url());
    b.system_prompt = "Be brief.".to_string();

    let reply = OllamaBackend::new()
        .chat(&b, &[ChatMessage::user("Hi")])
        .await
        .unwrap();

    assert_eq!(reply, "Hello there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ollama_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/chat")
        .with_status(404)
        .with_body(r#"{"error":"model \"nope\" not found"}"#)
        .create_async()
        .await;

    let err = OllamaBackend::new()
        .chat(&binding(ModelProvider::Ollama, "nope", server.url()), &[ChatMessage::user("Hi")])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Status {
            status: 404,
            message: "model \"nope\" not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_ollama_list_models_reads_tags() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models":[{"name":"llama3:latest"},{"name":"qwen2.5:7b"}]}"#)
        .create_async()
        .await;

    let router = ProviderRouter::new();
    let models = router
        .list_models(ModelProvider::Ollama, Some(&server.url()))
        .await;
    assert_eq!(models, vec!["llama3:latest", "qwen2.5:7b"]);
}

#[tokio::test]
async fn test_openai_compatible_chat_uses_bearer_and_strips_thinking() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({"model": "deepseek-reasoner", "stream": false})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"<think>plan</think> Final answer."}}]}"#)
        .create_async()
        .await;

    // a doubled version suffix is collapsed before the path is appended
    let mut b = binding(
        ModelProvider::Deepseek,
        "deepseek-reasoner",
        format!("{}/v1/v1/", server.url()),
    );
    b.api_key = Some("sk-test".to_string());

    let reply = ProviderRouter::new()
        .chat(&b, &[ChatMessage::user("Hi")])
        .await
        .unwrap();

    assert_eq!(reply, "Final answer.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_compatible_error_message_is_extracted() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid key"}}"#)
        .create_async()
        .await;

    let mut b = binding(ModelProvider::OpenAi, "gpt-4o", server.url());
    b.api_key = Some("bad".to_string());

    let err = OpenAiCompatibleBackend::new()
        .chat(&b, &[ChatMessage::user("Hi")])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 401,
            message: "Invalid key".to_string()
        }
    );
}

#[tokio::test]
async fn test_openai_probe_falls_back_to_completion() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/models")
        .with_status(404)
        .create_async()
        .await;
    let completion = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 1})))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"H"}}]}"#)
        .create_async()
        .await;

    let mut b = binding(ModelProvider::Moonshot, "moonshot-v1-8k", server.url());
    b.api_key = Some("sk".to_string());

    assert!(ProviderRouter::new().probe(&b).await);
    completion.assert_async().await;
}

#[tokio::test]
async fn test_openai_probe_without_key_is_false() {
    let b = ModelBinding::new(ModelProvider::OpenAi, "gpt-4o");
    assert!(!ProviderRouter::new().probe(&b).await);
}
