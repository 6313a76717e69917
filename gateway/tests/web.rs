use async_trait::async_trait;
use gateway::{AppState, app};
use persona::{Completer, GenerationError, HttpGateway, Session};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Answers with the last line of the prompt, or fails on demand.
struct Parrot;

#[async_trait]
impl Completer for Parrot {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.contains("FAIL") {
            return Err(GenerationError::Status(429));
        }
        let last = prompt
            .lines()
            .rev()
            .find(|l| l.starts_with("Human: ") || l.starts_with("Generate"))
            .unwrap_or_default();
        Ok(format!("  echo: {last}\n"))
    }
}

async fn serve() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState {
        completer: Arc::new(Parrot),
    };
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn index_serves() {
    let addr = serve().await;
    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn generate_returns_trimmed_text() {
    let addr = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/generate"))
        .body("Generate a detailed description of A, b.")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        "echo: Generate a detailed description of A, b."
    );
}

#[tokio::test]
async fn backend_failure_maps_to_bad_gateway() {
    let addr = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/generate"))
        .body("FAIL")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
}

#[tokio::test]
async fn empty_prompt_is_rejected() {
    let addr = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/generate"))
        .body("  ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn session_talks_through_gateway() {
    let addr = serve().await;
    let client = HttpGateway::new(format!("http://{addr}/api/generate"));
    let session = Session::new(Arc::new(client));

    session
        .submit_persona("John Dorian", "the main character from Scrubs")
        .await
        .unwrap()
        .await
        .unwrap();
    session.say("Hi!").await.unwrap().await.unwrap();

    let snap = session.snapshot().await;
    assert_eq!(
        snap.persona.unwrap().description,
        "echo: Generate a detailed description of John Dorian, the main character from Scrubs."
    );
    assert_eq!(snap.history, vec!["Hi!".to_string(), "echo: Human: Hi!".to_string()]);
    assert!(!snap.input_disabled);
}
