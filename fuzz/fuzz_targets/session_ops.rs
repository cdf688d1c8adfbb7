//! Fuzz target for the session state machine
//!
//! # Strategy
//!
//! Random interleavings of connect, close, inbound chunks and keepalive ticks
//! against a session driven by a manual clock.
//!
//! # Invariants
//!
//! - The roster never holds more than `CAPACITY` users
//! - Nothing reaches the sink while disconnected
//! - Keepalive lines are only produced while connected and armed
//! - At most one notice per close
//! - NEVER panic

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use natter_core::{CAPACITY, CloseReason, RecordingSink, Session, SessionAction};

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Connect { keep_alive: bool },
    Close { by_peer: bool },
    Chunk(Vec<u8>),
    Advance { secs: u16 },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut session: Session<Duration> = Session::default();
    let mut sink = RecordingSink::new();
    let mut now = Duration::ZERO;

    for op in ops {
        match op {
            Op::Connect { keep_alive } => {
                let was_connected = session.is_connected();
                let result = session.connected(now, keep_alive);
                assert_eq!(result.is_err(), was_connected);
            }
            Op::Close { by_peer } => {
                let reason = if by_peer { CloseReason::PeerClosed } else { CloseReason::Requested };
                let was_connected = session.is_connected();
                let actions = session.close(&reason);
                assert_eq!(actions.len(), usize::from(was_connected));
                assert!(!session.keepalive().is_armed());
            }
            Op::Chunk(bytes) => {
                let before = sink.events().len();
                let connected = session.is_connected();
                session.handle_chunk(&bytes, &mut sink);
                if !connected {
                    assert_eq!(sink.events().len(), before);
                }
            }
            Op::Advance { secs } => {
                now += Duration::from_secs(u64::from(secs));
                let armed = session.keepalive().is_armed();
                let actions = session.tick(now);
                if !armed || !session.is_connected() {
                    assert!(actions.is_empty());
                }
                assert!(actions.iter().all(|a| matches!(a, SessionAction::Send(line) if line == "\n")));
            }
        }

        assert!(session.roster().len() <= CAPACITY);
    }
});
