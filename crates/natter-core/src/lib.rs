//! Session layer for the talker protocol.
//!
//! Everything between the socket and the screen that has state: connection
//! lifecycle, the roster of present users, the keepalive timer, and the
//! dispatch of classified lines to the presentation layer.
//!
//! # Architecture
//!
//! Sans-IO and action-based. [`Session`] never touches a socket or a clock:
//! time comes in as a parameter and outbound work comes back as
//! [`SessionAction`]s. The transport in `natter-client` executes those
//! actions against a real `TcpStream`; tests execute them against vectors.
//!
//! # Components
//!
//! - [`Session`]: connection state, roster, keepalive, framing
//! - [`Roster`]: 256-slot user table with full-refresh rendering
//! - [`KeepAlive`]: idle timer deciding when to send an empty line
//! - [`dispatch()`]: applies one classified line to roster and sink
//! - [`DisplaySink`] / [`Notifier`]: presentation collaborators
//! - [`Environment`]: time source for the runtime

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod dispatch;
pub mod env;
pub mod error;
pub mod keepalive;
pub mod roster;
pub mod session;
pub mod sink;

pub use dispatch::dispatch;
pub use env::Environment;
pub use error::ConnectError;
pub use keepalive::{DEFAULT_KEEPALIVE_INTERVAL, KeepAlive, KeepAliveState};
pub use roster::{CAPACITY, Roster, UserSlot};
pub use session::{
    CloseReason, ConnectionState, DEFAULT_ANNOUNCEMENT, DISCONNECTED_TITLE, Session,
    SessionAction, SessionConfig,
};
pub use sink::{DisplayEvent, DisplaySink, Notifier, RecordingNotifier, RecordingSink};
