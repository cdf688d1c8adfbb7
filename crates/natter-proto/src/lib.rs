//! Talker wire protocol.
//!
//! The protocol is plaintext TCP carrying `\n`-terminated lines in both
//! directions. Servers may send `\r\n`; the carriage return is stripped on
//! receive and never sent.
//!
//! # Components
//!
//! - [`FrameAssembler`]: splits a raw chunk read from the socket into
//!   [`ProtocolLine`]s
//! - [`classify`]: turns one line into the [`Event`]s it carries (roster
//!   updates, private messages, links, plain chat)
//!
//! Nothing in this crate performs I/O. The session layer in `natter-core`
//! decides what to do with each event.
//!
//! # Line patterns
//!
//! | Pattern | Direction | Meaning |
//! |---|---|---|
//! | `.Z` | client to server | request the current user list |
//! | `+[<id>]<name>` | server to client | user `<id>` is present |
//! | `-[<id>]` | server to client | user `<id>` has left |
//! | `<...` | server to client | private message |
//! | `@...` | server to client | acknowledgement, not rendered |
//! | anything else | both | chat |

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod line;
mod message;

pub use line::{CARRIAGE_RETURN, FrameAssembler, LINE_FEED, LineError, ProtocolLine};
pub use message::{
    ACK_PREFIX, Event, JOIN_PREFIX, LEAVE_PREFIX, PRIVATE_PREFIX, SCAN_WINDOW, classify, find_url,
};

/// Line asking the server to replay the current user list as `+[id]name`
/// lines.
pub const USER_LIST_REQUEST: &str = ".Z";

/// Payload sent by the keepalive timer. Framing appends its own line feed, so
/// each keepalive reaches the server as `"\n\n"`: two blank lines.
pub const KEEPALIVE_LINE: &str = "\n";
