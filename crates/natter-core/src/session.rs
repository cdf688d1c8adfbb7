//! Session state machine.
//!
//! Owns everything one talker connection needs besides the socket: the
//! connection flag, the roster, the keepalive timer, and the framing buffer.
//! Uses the action pattern: methods take time as input and return
//! [`SessionAction`]s for the transport to execute, so the whole session can
//! be driven without a network.
//!
//! # State Machine
//!
//! ```text
//!                  connected(now, keep_alive)
//! ┌──────────────┐ ─────────────────────────> ┌───────────┐
//! │ Disconnected │                            │ Connected │
//! └──────────────┘ <───────────────────────── └───────────┘
//!                  close(reason)
//! ```
//!
//! Inbound chunks and keepalive ticks are ignored while disconnected.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

use natter_proto::{FrameAssembler, KEEPALIVE_LINE, USER_LIST_REQUEST};
use tracing::{debug, info};

use crate::{
    dispatch::dispatch,
    error::ConnectError,
    keepalive::{DEFAULT_KEEPALIVE_INTERVAL, KeepAlive},
    roster::Roster,
    sink::DisplaySink,
};

/// Announcement sent right after connecting.
pub const DEFAULT_ANNOUNCEMENT: &str = "% has connected using natter";

/// Dialog title for every disconnect notice.
pub const DISCONNECTED_TITLE: &str = "Disconnected";

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket
    Disconnected,
    /// Socket open, lines flowing
    Connected,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The user asked to disconnect
    Requested,
    /// The server closed the stream
    PeerClosed,
    /// Reading from the socket failed
    Failed(String),
}

impl CloseReason {
    /// Notice body shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::Requested => "Connection Closed".to_string(),
            Self::PeerClosed => "Connection closed by server".to_string(),
            Self::Failed(err) => format!("Connection lost: {err}"),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Line sent right after connecting, before the user list request.
    pub announcement: String,
    /// Keepalive wakeup period and idle threshold.
    pub keepalive_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            announcement: DEFAULT_ANNOUNCEMENT.to_string(),
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
        }
    }
}

/// Actions returned by the session state machine.
///
/// The transport executes these:
/// - `Send`: write the line plus `\n` if the socket is writable in time
/// - `Notify`: show a dialog through the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this line to the server
    Send(String),

    /// Show a notice to the user
    Notify {
        /// Dialog title
        title: String,
        /// Dialog body
        message: String,
    },
}

/// Session state for one client.
///
/// Pure state machine: no I/O. Generic over `Instant` to support both real
/// time and a manual clock in tests.
#[derive(Debug)]
pub struct Session<I = Instant>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    state: ConnectionState,
    config: SessionConfig,
    roster: Roster,
    keepalive: KeepAlive<I>,
    assembler: FrameAssembler,
}

impl<I> Session<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a disconnected session.
    pub fn new(config: SessionConfig) -> Self {
        let keepalive = KeepAlive::new(config.keepalive_interval);
        Self {
            state: ConnectionState::Disconnected,
            config,
            roster: Roster::new(),
            keepalive,
            assembler: FrameAssembler::new(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether lines may flow.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Present users.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Keepalive timer.
    pub fn keepalive(&self) -> &KeepAlive<I> {
        &self.keepalive
    }

    /// Configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Check that a new connection may be opened.
    ///
    /// # Errors
    ///
    /// - `ConnectError::AlreadyConnected` if a connection is open
    pub fn begin_connect(&self) -> Result<(), ConnectError> {
        match self.state {
            ConnectionState::Connected => Err(ConnectError::AlreadyConnected),
            ConnectionState::Disconnected => Ok(()),
        }
    }

    /// Record a freshly opened socket.
    ///
    /// Clears the roster, records `now` as the keepalive baseline, arms the
    /// keepalive timer if `keep_alive`, and returns the announcement and the
    /// user list request to send.
    ///
    /// # Errors
    ///
    /// - `ConnectError::AlreadyConnected` if a connection is open; nothing
    ///   changes
    pub fn connected(
        &mut self,
        now: I,
        keep_alive: bool,
    ) -> Result<Vec<SessionAction>, ConnectError> {
        self.begin_connect()?;

        self.roster.reset();
        self.state = ConnectionState::Connected;

        if keep_alive {
            self.keepalive.arm(now);
        } else {
            self.keepalive.disarm();
            self.keepalive.reset(now);
        }

        info!(keep_alive, "session connected");

        Ok(vec![
            SessionAction::Send(self.config.announcement.clone()),
            SessionAction::Send(USER_LIST_REQUEST.to_string()),
        ])
    }

    /// End the session.
    ///
    /// Returns nothing if already disconnected. Otherwise disarms the
    /// keepalive timer and returns the notice describing `reason`.
    pub fn close(&mut self, reason: &CloseReason) -> Vec<SessionAction> {
        if self.state == ConnectionState::Disconnected {
            return Vec::new();
        }

        self.state = ConnectionState::Disconnected;
        self.keepalive.disarm();

        info!(?reason, "session closed");

        vec![SessionAction::Notify {
            title: DISCONNECTED_TITLE.to_string(),
            message: reason.message(),
        }]
    }

    /// Frame and dispatch one inbound chunk.
    ///
    /// Returns the number of lines dispatched. Chunks arriving while
    /// disconnected are dropped. The sink is flushed once per chunk.
    pub fn handle_chunk<S>(&mut self, chunk: &[u8], sink: &mut S) -> usize
    where
        S: DisplaySink + ?Sized,
    {
        if self.state != ConnectionState::Connected {
            debug!(len = chunk.len(), "dropping chunk received while disconnected");
            return 0;
        }

        let lines = self.assembler.assemble(chunk);
        for line in &lines {
            dispatch(line, &mut self.roster, sink);
        }
        sink.flush();

        lines.len()
    }

    /// Process a keepalive timer wakeup.
    pub fn tick(&mut self, now: I) -> Vec<SessionAction> {
        if self.keepalive.tick(now, self.is_connected()) {
            debug!("keepalive due");
            vec![SessionAction::Send(KEEPALIVE_LINE.to_string())]
        } else {
            Vec::new()
        }
    }
}

impl<I> Default for Session<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
