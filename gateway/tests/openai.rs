use gateway::{OpenAiCompleter, Sampling};
use httpmock::Method::POST;
use httpmock::MockServer;
use persona::{Completer, GenerationError};
use serde_json::json;

#[tokio::test]
async fn sends_fixed_sampling_and_returns_first_choice() {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/completions")
            .header("authorization", "Bearer sk-test")
            .json_body(json!({
                "model": "text-davinci-002",
                "prompt": "Say hi",
                "temperature": 0.6,
                "max_tokens": 1500
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "choices": [{ "text": "\n\nHi there." }, { "text": "ignored" }]
            }));
    });

    let completer = OpenAiCompleter::new(server.base_url(), "sk-test", Sampling::default());
    let text = completer.complete("Say hi").await.unwrap();
    mock.assert();
    assert_eq!(text, "Hi there.");
}

#[tokio::test]
async fn provider_error_is_reported_as_status() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/v1/completions");
        then.status(429).body("rate limited");
    });

    let completer = OpenAiCompleter::new(server.base_url(), "k", Sampling::default());
    let err = completer.complete("x").await.unwrap_err();
    assert!(matches!(err, GenerationError::Status(429)));
}

#[tokio::test]
async fn empty_choices_are_invalid() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(POST).path("/v1/completions");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "choices": [] }));
    });

    let base_url = format!("{}/", server.base_url());
    let completer = OpenAiCompleter::new(base_url, "k", Sampling::default());
    let err = completer.complete("x").await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidResponse));
}
