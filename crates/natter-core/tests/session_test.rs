//! Session state machine tests.
//!
//! Drives [`Session`] with a manual clock and recording collaborators. No
//! sockets are involved: outbound work is inspected as [`SessionAction`]s.

use std::time::Duration;

use natter_core::{
    CloseReason, ConnectError, ConnectionState, DisplayEvent, KeepAliveState, RecordingSink,
    Session, SessionAction, SessionConfig,
};

type TestSession = Session<Duration>;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn connected_session(keep_alive: bool) -> TestSession {
    let mut session = TestSession::default();
    session.connected(Duration::ZERO, keep_alive).unwrap();
    session
}

fn sent(actions: &[SessionAction]) -> Vec<&str> {
    actions
        .iter()
        .filter_map(|a| match a {
            SessionAction::Send(line) => Some(line.as_str()),
            SessionAction::Notify { .. } => None,
        })
        .collect()
}

#[test]
fn connect_announces_then_requests_user_list() {
    let config = SessionConfig { announcement: "% waves".into(), ..SessionConfig::default() };
    let mut session: TestSession = Session::new(config);

    let actions = session.connected(Duration::ZERO, false).unwrap();

    assert_eq!(session.state(), ConnectionState::Connected);
    assert_eq!(sent(&actions), ["% waves", ".Z"]);
}

#[test]
fn connect_while_connected_is_rejected_and_keeps_state() {
    let mut session = connected_session(false);
    let mut sink = RecordingSink::new();
    session.handle_chunk(b"+[1]amy\n", &mut sink);

    let err = session.connected(secs(5), true).unwrap_err();

    assert_eq!(err, ConnectError::AlreadyConnected);
    assert_eq!(session.begin_connect(), Err(ConnectError::AlreadyConnected));
    assert_eq!(session.state(), ConnectionState::Connected);
    assert_eq!(session.roster().get(1), Some("amy"));
    assert_eq!(session.keepalive().state(), KeepAliveState::Idle);
}

#[test]
fn reconnect_resets_roster() {
    let mut session = connected_session(false);
    let mut sink = RecordingSink::new();
    session.handle_chunk(b"+[1]amy\n+[2]bob\n", &mut sink);
    assert_eq!(session.roster().len(), 2);

    session.close(&CloseReason::Requested);
    session.connected(secs(10), false).unwrap();

    assert!(session.roster().is_empty());
}

#[test]
fn join_and_chat_in_one_chunk() {
    let mut session = connected_session(false);
    let mut sink = RecordingSink::new();

    let dispatched = session.handle_chunk(b"+[3]bob\r\nhello\r\n", &mut sink);

    assert_eq!(dispatched, 2);
    assert_eq!(session.roster().get(3), Some("bob"));
    assert_eq!(sink.events(), [
        DisplayEvent::ClearUsers,
        DisplayEvent::User { id: 3, name: "bob".into() },
        DisplayEvent::Chat("hello\n".into()),
    ]);
    assert_eq!(sink.flushes(), 1);
}

#[test]
fn chunks_are_ignored_while_disconnected() {
    let mut session = TestSession::default();
    let mut sink = RecordingSink::new();

    assert_eq!(session.handle_chunk(b"hello\n", &mut sink), 0);
    assert!(sink.events().is_empty());
    assert_eq!(sink.flushes(), 0);
}

#[test]
fn close_notifies_once() {
    let mut session = connected_session(true);

    let actions = session.close(&CloseReason::Requested);
    assert_eq!(actions, [SessionAction::Notify {
        title: "Disconnected".into(),
        message: "Connection Closed".into(),
    }]);
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert!(!session.keepalive().is_armed());

    assert!(session.close(&CloseReason::Requested).is_empty());
}

#[test]
fn peer_close_has_its_own_message() {
    let mut session = connected_session(false);

    let actions = session.close(&CloseReason::PeerClosed);
    assert_eq!(actions, [SessionAction::Notify {
        title: "Disconnected".into(),
        message: "Connection closed by server".into(),
    }]);
}

#[test]
fn keepalive_sends_one_empty_line_after_threshold() {
    let mut session = connected_session(true);

    assert!(session.tick(secs(119)).is_empty());
    assert!(session.tick(secs(120)).is_empty());

    let actions = session.tick(secs(121));
    assert_eq!(sent(&actions), ["\n"]);
    assert_eq!(session.keepalive().last_reset(), Some(secs(121)));

    assert!(session.tick(secs(122)).is_empty());
}

#[test]
fn keepalive_is_inert_when_not_requested() {
    let mut session = connected_session(false);
    assert!(session.tick(secs(1_000)).is_empty());
}

#[test]
fn keepalive_stops_after_disconnect() {
    let mut session = connected_session(true);
    session.close(&CloseReason::PeerClosed);

    assert!(session.tick(secs(1_000)).is_empty());
}
