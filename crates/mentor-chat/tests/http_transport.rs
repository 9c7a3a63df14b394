use std::sync::Arc;

use mentor_chat::prelude::*;
use mentor_chat::status::GENERIC_FAILURE;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_PATH: &str = "/functions/v1/mentor-chat";

fn session_for(server: &MockServer) -> ChatSession {
    let config = ChatClientConfig::new(format!("{}{CHAT_PATH}", server.uri()), "test-key");
    let transport = HttpChatTransport::new(config).expect("transport");
    ChatSession::new(Arc::new(transport))
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::from(": connected\n\n");
    for fragment in fragments {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({"choices": [{"index": 0, "delta": {"content": fragment}}]})
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn streams_reply_from_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({"messages": [{"role": "user", "content": "hi"}]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["Hello", ", ", "founder"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let run = session.submit("hi").await.expect("submit");
    let mut deltas = 0;
    let outcome = session
        .drive(run, |_, event| {
            if matches!(event, ChatEvent::Delta { .. }) {
                deltas += 1;
            }
        })
        .await
        .expect("drive");

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(deltas, 3);
    assert_eq!(
        session.conversation().messages(),
        &[Message::user("hi"), Message::assistant("Hello, founder")]
    );
}

#[tokio::test]
async fn rate_limit_body_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "slow down"})))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let run = session.submit("hi").await.expect("submit");
    let outcome = session.drive(run, |_, _| {}).await.expect("drive");

    assert_eq!(
        outcome,
        StreamOutcome::RateLimited {
            message: "slow down".into()
        }
    );
    assert_eq!(outcome.notice().map(|n| n.message), Some("slow down".into()));
    assert_eq!(session.conversation().messages(), &[Message::user("hi")]);
    assert_eq!(session.state(), ChatState::Idle);
}

#[tokio::test]
async fn server_error_is_a_generic_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let run = session.submit("hi").await.expect("submit");
    let outcome = session.drive(run, |_, _| {}).await.expect("drive");

    assert!(matches!(outcome, StreamOutcome::Failed { ref reason } if reason.contains("500")));
    let notice = outcome.notice().expect("notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, GENERIC_FAILURE);
    assert!(session.can_submit());
}
