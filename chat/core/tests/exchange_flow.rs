//! Integration tests for the exchange flow
//!
//! These tests drive the public API the way a surface does:
//! - Repeated exchanges building an alternating log
//! - Surface messages replayed against a local view
//! - Regenerate after a run of exchanges
//! - The real HTTP transport against a mock endpoint
//! - Configuration feeding the HTTP transport

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qa_chat_core::config::{load_config_from_path, ConfigOverrides};
use qa_chat_core::{
    ChatSession, ExchangeController, ExchangeError, HttpTransport, Role, ScriptedTransport,
    SurfaceMessage, Turn,
};

fn drain(rx: &mut mpsc::UnboundedReceiver<SurfaceMessage>) -> Vec<SurfaceMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// What a surface would show after applying messages in order
#[derive(Debug, Default)]
struct View {
    turns: Vec<Turn>,
    buffer: String,
    busy: bool,
    failures: usize,
}

impl View {
    fn apply(&mut self, msg: SurfaceMessage) {
        match msg {
            SurfaceMessage::TurnAppended { index, turn } => {
                assert_eq!(index, self.turns.len(), "turns are appended at the end");
                self.turns.push(turn);
            }
            SurfaceMessage::TurnRemoved { index } => {
                assert_eq!(index + 1, self.turns.len(), "only the last turn is removed");
                self.turns.pop();
            }
            SurfaceMessage::Busy { busy } => self.busy = busy,
            SurfaceMessage::StreamBuffer { content } => self.buffer = content,
            SurfaceMessage::ExchangeFailed { .. } => self.failures += 1,
        }
    }
}

// =============================================================================
// Repeated exchanges
// =============================================================================

#[tokio::test]
async fn test_n_exchanges_produce_2n_alternating_turns() {
    let questions = ["Q1", "Q2", "Q3", "Q4", "Q5"];
    let mut transport = ScriptedTransport::new();
    for (i, _) in questions.iter().enumerate() {
        transport = transport.reply([format!("A{}", i + 1), " done".to_string()]);
    }

    let controller = ExchangeController::new(Arc::new(transport), Arc::new(ChatSession::new()));

    for question in questions {
        controller.send(question).await.unwrap();
    }

    let turns = controller.session().turns();
    assert_eq!(turns.len(), 2 * questions.len());
    for (i, pair) in turns.chunks(2).enumerate() {
        assert_eq!(pair[0], Turn::user(questions[i]));
        assert_eq!(pair[1], Turn::assistant(format!("A{} done", i + 1)));
    }

    // each request carried exactly the log preceding its question
    let requests = controller.transport().requests();
    for (i, request) in requests.iter().enumerate() {
        assert_eq!(request.history, turns[..2 * i].to_vec());
        assert_eq!(request.message, questions[i]);
    }
}

#[tokio::test]
async fn test_buffer_is_running_concatenation_of_fragments() {
    let fragments = ["The ", "skills ", "assessment ", "takes ", "8 weeks."];
    let transport = ScriptedTransport::new().reply(fragments);
    let mut controller =
        ExchangeController::new(Arc::new(transport), Arc::new(ChatSession::new()));
    let mut rx = controller.subscribe();

    controller.send("How long?").await.unwrap();

    let buffers: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|msg| match msg {
            SurfaceMessage::StreamBuffer { content } if !content.is_empty() => Some(content),
            _ => None,
        })
        .collect();

    let expected: Vec<String> = (1..=fragments.len())
        .map(|n| fragments[..n].concat())
        .collect();
    assert_eq!(buffers, expected);
}

#[tokio::test]
async fn test_surface_view_matches_session_after_mixed_outcomes() {
    let transport = ScriptedTransport::new()
        .reply(["A1"])
        .fail_after(["half"], "reset")
        .no_body()
        .reply(["A4"])
        .reply(["A4b"]);
    let session = Arc::new(ChatSession::new());
    let mut controller = ExchangeController::new(Arc::new(transport), session.clone());
    let mut rx = controller.subscribe();
    let mut view = View::default();

    controller.send("Q1").await.unwrap();
    assert!(controller.send("Q2").await.is_err());
    assert_eq!(
        controller.send("Q3").await,
        Err(ExchangeError::TransportUnavailable)
    );
    controller.send("Q4").await.unwrap();
    controller.regenerate().await.unwrap();

    for msg in drain(&mut rx) {
        view.apply(msg);
    }

    let snapshot = session.snapshot();
    assert_eq!(view.turns, snapshot.turns);
    assert_eq!(view.buffer, "");
    assert!(!view.busy);
    assert_eq!(view.failures, 2);

    let roles: Vec<Role> = snapshot.turns.iter().map(Turn::role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::User,
            Role::User,
            Role::User,
            Role::Assistant,
        ]
    );
    assert_eq!(snapshot.turns[5], Turn::assistant("A4b"));
}

#[tokio::test]
async fn test_regenerate_after_several_exchanges() {
    let transport = ScriptedTransport::new()
        .reply(["A1"])
        .reply(["A2"])
        .reply(["A2b"]);
    let controller = ExchangeController::new(
        Arc::new(transport),
        Arc::new(ChatSession::with_system_prompt("Answer briefly.")),
    );

    controller.send("Q1").await.unwrap();
    controller.send("Q2").await.unwrap();
    controller.regenerate().await.unwrap();

    let requests = controller.transport().requests();
    assert_eq!(
        requests[2].history,
        vec![
            Turn::system("Answer briefly."),
            Turn::user("Q1"),
            Turn::assistant("A1"),
        ]
    );
    assert_eq!(requests[2].message, "Q2");
    assert_eq!(
        controller.session().turns().last(),
        Some(&Turn::assistant("A2b"))
    );
    assert_eq!(controller.session().len(), 5);
}

// =============================================================================
// HTTP transport end to end
// =============================================================================

#[tokio::test]
async fn test_http_exchange_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/qa"))
        .and(body_partial_json(serde_json::json!({ "message": "Hello" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_bytes("Grüß dich 👋".as_bytes()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(format!("{}/api/v1/qa", server.uri()));
    let controller = ExchangeController::new(Arc::new(transport), Arc::new(ChatSession::new()));

    let turn = controller.send("Hello").await.unwrap();
    assert_eq!(turn.content(), "Grüß dich 👋");
    assert_eq!(
        controller.session().turns(),
        vec![Turn::user("Hello"), Turn::assistant("Grüß dich 👋")]
    );
}

#[tokio::test]
async fn test_http_error_body_is_committed_as_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"detail":"boom"}"#))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(format!("{}/api/v1/qa", server.uri()));
    let controller = ExchangeController::new(Arc::new(transport), Arc::new(ChatSession::new()));

    let turn = controller.send("Hello").await.unwrap();
    assert_eq!(turn, Turn::assistant(r#"{"detail":"boom"}"#));

    let snapshot = controller.session().snapshot();
    assert_eq!(
        snapshot.turns,
        vec![Turn::user("Hello"), Turn::assistant(r#"{"detail":"boom"}"#)]
    );
    assert_eq!(snapshot.streaming, None);
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn test_unreachable_endpoint_leaves_question_unanswered() {
    let transport = HttpTransport::with_connect_timeout(
        "http://127.0.0.1:1/api/v1/qa",
        Duration::from_millis(500),
    );
    let controller = ExchangeController::new(Arc::new(transport), Arc::new(ChatSession::new()));

    let error = controller.send("Hello").await.unwrap_err();
    assert!(error.is_transport_failure());

    let snapshot = controller.session().snapshot();
    assert_eq!(snapshot.turns, vec![Turn::user("Hello")]);
    assert_eq!(snapshot.streaming, None);
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn test_config_file_drives_http_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/custom/qa"))
        .respond_with(ResponseTemplate::new(200).set_body_string("from config"))
        .mount(&server)
        .await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[endpoint]\nconnect_timeout_ms = 1000").unwrap();

    let mut config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
    ConfigOverrides::new()
        .with_endpoint(format!("{}/custom/qa", server.uri()))
        .apply(&mut config)
        .unwrap();

    let transport = HttpTransport::from_config(&config);
    let controller = ExchangeController::new(Arc::new(transport), Arc::new(ChatSession::new()));

    let turn = controller.send("Hello").await.unwrap();
    assert_eq!(turn.content(), "from config");
}
