//! Integration tests for the collaborator HTTP clients using wiremock.

use newsint_intel::{zero_vector, CompletionClient, EmbeddingClient, EMBEDDING_DIM};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn full_vector(fill: f32) -> Vec<f32> {
    vec![fill; EMBEDDING_DIM]
}

#[tokio::test]
async fn embedding_client_parses_vector() {
    let server = MockServer::start().await;
    let vector = full_vector(0.25);

    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_json(serde_json::json!({"inputs": ["RBI hikes rates"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([vector])))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&server.uri(), 5).expect("client");
    let embedded = client.embed("RBI hikes rates").await.expect("vector");

    assert_eq!(embedded.len(), EMBEDDING_DIM);
    assert!((embedded[0] - 0.25).abs() < f32::EPSILON);
}

#[tokio::test]
async fn embedding_client_rejects_wrong_dimension() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([[0.1, 0.2, 0.3]])),
        )
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&server.uri(), 5).expect("client");
    let err = client.embed("short vector").await.expect_err("must fail");
    assert!(err.to_string().contains("dimension"), "got: {err}");
}

#[tokio::test]
async fn embed_or_zero_degrades_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(&server.uri(), 5).expect("client");
    let outcome = client.embed_or_zero("anything").await;

    assert!(outcome.is_degraded());
    assert_eq!(*outcome.value(), zero_vector());
}

#[tokio::test]
async fn completion_client_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                {"message": {"content": "first answer"}},
                {"message": {"content": "second answer"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), None, "test-model", 5).expect("client");
    let completion = client.complete("prompt", 128).await.expect("completion");
    assert_eq!(completion, "first answer");
}

#[tokio::test]
async fn completion_client_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "authed"}}]
        })))
        .mount(&server)
        .await;

    let client =
        CompletionClient::new(&server.uri(), Some("test-key"), "test-model", 5).expect("client");
    let completion = client.complete("prompt", 64).await.expect("completion");
    assert_eq!(completion, "authed");
}

#[tokio::test]
async fn completion_client_errors_on_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let client = CompletionClient::new(&server.uri(), None, "test-model", 5).expect("client");
    let err = client.complete("prompt", 64).await.expect_err("must fail");
    assert!(err.to_string().contains("no choices"), "got: {err}");
}
