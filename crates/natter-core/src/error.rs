//! Error types.
//!
//! Connection setup is the only fallible operation in the session layer.
//! Protocol lines never fail: malformed input is tolerated and rendered as
//! chat. Send failures are logged and dropped, never surfaced.

use std::io;

use thiserror::Error;

/// Errors that can occur while establishing a connection.
///
/// None of these are retried. Each is shown to the user through
/// [`crate::Notifier`] with [`ConnectError::title`] as the dialog title.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// A connection is already open; it was left untouched
    #[error("Already connected to a server.")]
    AlreadyConnected,

    /// The address did not resolve to any IPv4 address
    #[error("Could not obtain IP address for {address}: {reason}")]
    ResolutionFailed {
        /// Address as given by the caller
        address: String,
        /// Resolver error, or why no candidate was usable
        reason: String,
    },

    /// The OS refused to create a socket
    #[error("Could not open socket: {0}")]
    SocketOpenFailed(String),

    /// Every resolved candidate refused or timed out
    #[error("Could not connect to {address}:{port}: {reason}")]
    ConnectFailed {
        /// Address as given by the caller
        address: String,
        /// Port as given by the caller
        port: u16,
        /// Error from the last candidate tried
        reason: String,
    },
}

impl ConnectError {
    /// Title for the notification dialog.
    pub fn title(&self) -> &'static str {
        "Error"
    }

    /// Build a [`ConnectError::SocketOpenFailed`] from the OS error.
    pub fn socket_open(err: &io::Error) -> Self {
        Self::SocketOpenFailed(err.to_string())
    }
}
