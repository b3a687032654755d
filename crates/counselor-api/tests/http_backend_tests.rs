use counselor_api::HttpChatBackend;
use counselor_chat::{ChatBackend, Coordinator, MessageExchange};
use counselor_types::{ChatRequest, ExchangeError, Message, FALLBACK_REPLY, MISSING_REPLY};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        user_id: "Guest".to_string(),
        message: message.to_string(),
    }
}

async fn server_replying(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_posts_user_id_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({"user_id": "Ada", "message": "Best career?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Data science."})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    let reply = backend
        .send(&ChatRequest {
            user_id: "Ada".to_string(),
            message: "Best career?".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(reply.text, "Data science.");
}

#[tokio::test]
async fn test_accepts_reply_field() {
    let server = server_replying(ResponseTemplate::new(200).set_body_json(json!({"reply": "Hi!"}))).await;
    let reply = HttpChatBackend::new(server.uri()).send(&request("hello")).await.unwrap();
    assert_eq!(reply.text, "Hi!");
}

#[tokio::test]
async fn test_missing_fields_yield_placeholder() {
    let server = server_replying(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))).await;
    let reply = HttpChatBackend::new(server.uri()).send(&request("hello")).await.unwrap();
    assert_eq!(reply.text, MISSING_REPLY);
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let server = server_replying(ResponseTemplate::new(500)).await;
    let err = HttpChatBackend::new(server.uri()).send(&request("hello")).await.unwrap_err();
    assert_eq!(err, ExchangeError::Status(500));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = server_replying(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    let err = HttpChatBackend::new(server.uri()).send(&request("hello")).await.unwrap_err();
    assert!(matches!(err, ExchangeError::Malformed(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Nothing listens on port 9 (discard) on test machines
    let err = HttpChatBackend::new("http://127.0.0.1:9").send(&request("hello")).await.unwrap_err();
    assert!(matches!(err, ExchangeError::Transport(_)));
}

#[tokio::test]
async fn test_exchange_uses_remote_reply() {
    let server = server_replying(ResponseTemplate::new(200).set_body_json(json!({"response": "Hello!"}))).await;
    let state = RefCell::new(Coordinator::in_memory());
    let exchange = MessageExchange::new(HttpChatBackend::new(server.uri()));

    exchange.send(&state, "hi").await.unwrap();

    assert_eq!(
        state.borrow().active_messages().to_vec(),
        vec![Message::user("hi"), Message::bot("Hello!")]
    );
}

#[tokio::test]
async fn test_exchange_falls_back_on_http_500() {
    let server = server_replying(ResponseTemplate::new(500)).await;
    let state = RefCell::new(Coordinator::in_memory());
    let exchange = MessageExchange::new(HttpChatBackend::new(server.uri()));

    exchange.send(&state, "hi").await.unwrap();

    assert_eq!(
        state.borrow().active_messages().to_vec(),
        vec![Message::user("hi"), Message::bot(FALLBACK_REPLY)]
    );
}

#[tokio::test]
async fn test_history_lists_stored_exchanges() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/Ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "local-1", "message": "hi", "reply": "Hello!", "timestamp": 1700000000},
            {"message": "resume?", "reply": "Keep it to one page."}
        ])))
        .mount(&server)
        .await;

    let history = HttpChatBackend::new(server.uri()).history("Ada").await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id.as_deref(), Some("local-1"));
    assert_eq!(history[0].timestamp, Some(1_700_000_000));
    assert_eq!(history[1].reply, "Keep it to one page.");
    assert_eq!(history[1].timestamp, None);
}

#[tokio::test]
async fn test_history_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/Ada"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = HttpChatBackend::new(server.uri()).history("Ada").await.unwrap_err();
    assert_eq!(err, ExchangeError::Status(404));
}
