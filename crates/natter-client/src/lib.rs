//! Client
//!
//! Tokio transport and event loop for the talker session layer.
//!
//! # Architecture
//!
//! Protocol state lives in the Sans-IO [`natter_core::Session`]. This crate
//! supplies the I/O around it: a [`ConnectionManager`] that owns the TCP
//! socket and executes session actions, and a [`Runtime`] that multiplexes
//! user commands, socket reads and the keepalive timer.
//!
//! # Components
//!
//! - [`ConnectionManager`]: connect, send, receive, disconnect
//! - [`Runtime`] / [`Command`]: `select!` loop fed by a command channel
//! - [`SystemEnv`]: production clock and timers
//! - [`ClientConfig`]: session settings plus transport tuning

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod runtime;
mod system_env;
mod transport;

pub use config::{ClientConfig, DEFAULT_READ_BUFFER_SIZE, DEFAULT_SEND_TIMEOUT};
pub use natter_core::{
    CloseReason, ConnectError, DisplaySink, Environment, Notifier, SessionConfig,
};
pub use runtime::{Command, Runtime};
pub use system_env::SystemEnv;
pub use transport::{ConnectionManager, ReadOutcome};
