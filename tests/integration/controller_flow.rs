//! Controller flow tests: keystrokes go through update, commands run against
//! the stub backend, and results come back as messages.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;

use medq::config::Config;
use medq::display::{EMPTY_QUERY_MESSAGE, FALLBACK_UNEXPECTED};
use medq::query::QueryClient;
use medq::tea::{DismissId, Focus, Message, View};

use crate::fixtures::{kawasaki_reply, Harness, Reply, StubBackend};

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

fn ctrl_enter() -> Message {
    Message::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL))
}

fn type_text(h: &mut Harness, text: &str) {
    for c in text.chars() {
        h.send(key(KeyCode::Char(c)));
    }
}

#[tokio::test]
async fn test_submit_then_response() {
    let stub = StubBackend::start(kawasaki_reply()).await;
    let mut h = Harness::new(&stub);

    type_text(&mut h, "  kawasaki treatment ");
    h.send(ctrl_enter());
    assert!(h.model.view.is_loading());
    assert!(!h.model.submit_enabled());

    h.pump().await;

    match &h.model.view {
        View::Response { view, .. } => {
            assert_eq!(view.route, "Medical Q&A Database");
            assert_eq!(view.steps.len(), 3);
        }
        other => panic!("Expected Response, got {:?}", other),
    }
    assert!(h.model.submit_enabled());
    assert_eq!(h.effects.pending_queries(), 0);
    assert_eq!(stub.bodies(), vec![json!({ "query": "kawasaki treatment" })]);
}

#[tokio::test]
async fn test_blank_submit_never_reaches_backend() {
    let stub = StubBackend::start(kawasaki_reply()).await;
    let mut h = Harness::new(&stub);

    type_text(&mut h, "   ");
    h.send(ctrl_enter());

    match &h.model.view {
        View::Error { message, .. } => assert_eq!(message, EMPTY_QUERY_MESSAGE),
        other => panic!("Expected Error, got {:?}", other),
    }
    assert_eq!(h.effects.pending_queries(), 0);
    assert_eq!(h.effects.pending_dismissals(), 1);
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_failure_banner_dismisses_itself() {
    let stub = StubBackend::start(Reply::json(
        500,
        json!({ "success": false, "error": "Graph execution failed" }),
    ))
    .await;
    let mut h = Harness::new(&stub);
    h.model.error_dismiss = Duration::from_millis(50);

    type_text(&mut h, "fever");
    h.send(ctrl_enter());
    h.pump().await;

    match &h.model.view {
        View::Error { message, .. } => assert_eq!(message, "Graph execution failed"),
        other => panic!("Expected Error, got {:?}", other),
    }
    assert!(h.model.submit_enabled());

    h.pump().await;
    assert_eq!(h.model.view, View::Idle);
    assert_eq!(h.effects.pending_dismissals(), 0);
}

#[tokio::test]
async fn test_resubmit_cancels_old_dismiss_timer() {
    let stub = StubBackend::start(Reply::json(200, json!({ "success": false }))).await;
    let mut h = Harness::new(&stub);
    h.model.error_dismiss = Duration::from_millis(200);

    type_text(&mut h, "first");
    h.send(ctrl_enter());
    h.pump().await;
    assert!(matches!(h.model.view, View::Error { .. }));

    // Leaving the banner cancels its timer
    h.send(ctrl_enter());
    assert!(h.model.view.is_loading());
    assert_eq!(h.effects.pending_dismissals(), 0);

    h.pump().await;
    let View::Error { dismiss, .. } = h.model.view else {
        panic!("Expected second Error");
    };

    // Only the second banner's timer fires
    h.pump().await;
    assert_eq!(h.model.view, View::Idle);
    assert_eq!(dismiss, DismissId(2));
    assert!(h.quiet_for(Duration::from_millis(300)).await);
}

#[tokio::test]
async fn test_submit_ignored_while_loading() {
    let stub = StubBackend::start(kawasaki_reply().delayed(Duration::from_millis(200))).await;
    let mut h = Harness::new(&stub);

    type_text(&mut h, "kawasaki");
    h.send(ctrl_enter());
    h.send(ctrl_enter());
    h.send(ctrl_enter());
    assert_eq!(h.effects.pending_queries(), 1);

    h.pump().await;
    assert!(matches!(h.model.view, View::Response { .. }));
    assert!(h.quiet_for(Duration::from_millis(300)).await);
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn test_example_pick_supersedes_in_flight_request() {
    let stub = StubBackend::start(kawasaki_reply().delayed(Duration::from_millis(150))).await;
    let mut h = Harness::new(&stub);

    type_text(&mut h, "first question");
    h.send(ctrl_enter());
    let View::Loading { id: first, .. } = h.model.view else {
        panic!("Expected Loading");
    };

    h.send(key(KeyCode::Tab));
    assert_eq!(h.model.focus, Focus::Examples);
    h.send(key(KeyCode::Right));
    h.send(key(KeyCode::Enter));

    let View::Loading { id: second, .. } = h.model.view else {
        panic!("Expected Loading after pick");
    };
    assert_ne!(first, second);
    assert_eq!(h.effects.pending_queries(), 1);
    assert_eq!(h.model.input, h.model.examples[1]);

    h.pump().await;
    assert!(matches!(h.model.view, View::Response { .. }));
    // The cancelled request never reports back
    assert!(h.quiet_for(Duration::from_millis(400)).await);
}

#[tokio::test]
async fn test_unreachable_backend_shows_unexpected_error() {
    let config = Config::default();
    let client = QueryClient::new("http://127.0.0.1:9", None).unwrap();
    let mut h = Harness::with_client(&config, client);

    type_text(&mut h, "fever");
    h.send(ctrl_enter());
    h.pump().await;

    match &h.model.view {
        View::Error { message, .. } => {
            assert_eq!(message, FALLBACK_UNEXPECTED)
        }
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_quit_keys() {
    let stub = StubBackend::start(kawasaki_reply()).await;
    let mut h = Harness::new(&stub);

    assert!(h.send(key(KeyCode::Esc)));
    assert!(h.send(Message::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL
    ))));
}
