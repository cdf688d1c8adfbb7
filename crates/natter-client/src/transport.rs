//! TCP transport for a talker session.
//!
//! [`ConnectionManager`] owns the socket and executes the
//! [`SessionAction`]s produced by the Sans-IO [`Session`]. Protocol logic
//! stays in the session; this layer resolves, connects, writes and reads.
//!
//! Only IPv4 candidates are tried. Outbound lines that cannot be written
//! within the send timeout are dropped rather than queued.

use std::net::SocketAddr;

use bytes::BytesMut;
use natter_core::{
    CloseReason, ConnectError, DisplaySink, Environment, Notifier, Session, SessionAction,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpSocket, TcpStream, lookup_host},
};
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;

/// Result of one socket read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Data arrived; this many lines were dispatched.
    Lines(usize),
    /// The connection ended during this read.
    Closed,
    /// There was no connection to read from.
    NotConnected,
}

/// Owns the socket and the session for one client.
///
/// # Type Parameters
///
/// - `E`: Clock and timer source
/// - `D`: Receives dispatched lines
/// - `N`: Receives connect errors and disconnect notices
pub struct ConnectionManager<E, D, N>
where
    E: Environment,
    D: DisplaySink,
    N: Notifier,
{
    env: E,
    config: ClientConfig,
    session: Session<E::Instant>,
    stream: Option<TcpStream>,
    read_buf: BytesMut,
    sink: D,
    notifier: N,
}

impl<E, D, N> ConnectionManager<E, D, N>
where
    E: Environment,
    D: DisplaySink,
    N: Notifier,
{
    /// Create a disconnected manager.
    pub fn new(env: E, config: ClientConfig, sink: D, notifier: N) -> Self {
        let session = Session::new(config.session.clone());
        let read_buf = BytesMut::with_capacity(config.read_buffer_size.max(1));
        Self { env, config, session, stream: None, read_buf, sink, notifier }
    }

    /// Environment the manager reads time from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Transport configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Session state: roster, keepalive, connection flag.
    pub fn session(&self) -> &Session<E::Instant> {
        &self.session
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Address of the connected server.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|stream| stream.peer_addr().ok())
    }

    /// Display sink.
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Display sink, mutably.
    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// Notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Connect to `address:port`, announce, and request the user list.
    ///
    /// Every failure is also reported through the notifier with title
    /// `"Error"`. The keepalive timer is armed when `keep_alive` is set.
    ///
    /// # Errors
    ///
    /// - `ConnectError::AlreadyConnected` if a connection is open
    /// - `ConnectError::ResolutionFailed` if `address` yields no IPv4 address
    /// - `ConnectError::SocketOpenFailed` if a socket cannot be created
    /// - `ConnectError::ConnectFailed` if no candidate accepts the connection
    pub async fn connect(
        &mut self,
        address: &str,
        port: u16,
        keep_alive: bool,
    ) -> Result<(), ConnectError> {
        let result = self.open(address, port, keep_alive).await;
        if let Err(err) = &result {
            warn!(address, port, %err, "connect failed");
            self.notifier.notify(err.title(), &err.to_string());
        }
        result
    }

    async fn open(&mut self, address: &str, port: u16, keep_alive: bool) -> Result<(), ConnectError> {
        self.session.begin_connect()?;

        let candidates = resolve(address, port).await?;
        let stream = connect_first(address, port, &candidates).await?;

        info!(address, port, peer = ?stream.peer_addr().ok(), "connected");

        let actions = self.session.connected(self.env.now(), keep_alive)?;
        self.stream = Some(stream);
        self.execute(actions).await;

        Ok(())
    }

    /// Close the connection at the user's request.
    ///
    /// Notifies once. Does nothing while disconnected.
    pub fn disconnect(&mut self) {
        self.close(&CloseReason::Requested);
    }

    /// Send one line to the server.
    ///
    /// Does nothing while disconnected. The writability wait and the write
    /// together are bounded by the configured send timeout; a line that does
    /// not go out in time is dropped, possibly after a partial write. A
    /// failed write also drops the line. The connection stays up until a
    /// read notices the failure.
    pub async fn send(&mut self, line: &str) {
        if !self.session.is_connected() {
            trace!(line, "not connected; ignoring send");
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        let mut payload = Vec::with_capacity(line.len() + 1);
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');

        let write = async {
            stream.writable().await?;
            stream.write_all(&payload).await
        };

        match tokio::time::timeout(self.config.send_timeout, write).await {
            Ok(Ok(())) => {},
            Ok(Err(err)) => warn!(%err, "write failed; dropping line"),
            Err(_) => debug!(
                timeout = ?self.config.send_timeout,
                len = payload.len(),
                "socket busy; dropping line"
            ),
        }
    }

    /// Read one chunk and dispatch its lines to the sink.
    ///
    /// End of stream or a read error closes the connection and notifies.
    /// Cancel-safe: the socket read is the only await point.
    pub async fn receive(&mut self) -> ReadOutcome {
        let Some(stream) = self.stream.as_mut() else {
            return ReadOutcome::NotConnected;
        };

        self.read_buf.clear();
        self.read_buf.resize(self.config.read_buffer_size.max(1), 0);

        match stream.read(&mut self.read_buf[..]).await {
            Ok(0) => {
                self.close(&CloseReason::PeerClosed);
                ReadOutcome::Closed
            },
            Ok(n) => {
                trace!(bytes = n, "received chunk");
                ReadOutcome::Lines(self.session.handle_chunk(&self.read_buf[..n], &mut self.sink))
            },
            Err(err) => {
                warn!(%err, "read failed");
                self.close(&CloseReason::Failed(err.to_string()));
                ReadOutcome::Closed
            },
        }
    }

    /// Handle a keepalive timer wakeup.
    pub async fn keepalive_tick(&mut self) {
        let actions = self.session.tick(self.env.now());
        self.execute(actions).await;
    }

    fn close(&mut self, reason: &CloseReason) {
        self.stream = None;

        for action in self.session.close(reason) {
            match action {
                SessionAction::Notify { title, message } => self.notifier.notify(&title, &message),
                SessionAction::Send(line) => debug!(line, "dropping send requested on close"),
            }
        }
    }

    async fn execute(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Send(line) => self.send(&line).await,
                SessionAction::Notify { title, message } => self.notifier.notify(&title, &message),
            }
        }
    }
}

/// Resolve `address`, keeping IPv4 results only.
async fn resolve(address: &str, port: u16) -> Result<Vec<SocketAddr>, ConnectError> {
    let resolution_failed = |reason: String| ConnectError::ResolutionFailed {
        address: address.to_string(),
        reason,
    };

    let candidates: Vec<SocketAddr> = lookup_host((address, port))
        .await
        .map_err(|e| resolution_failed(e.to_string()))?
        .filter(SocketAddr::is_ipv4)
        .collect();

    if candidates.is_empty() {
        return Err(resolution_failed("no IPv4 address".to_string()));
    }

    debug!(address, count = candidates.len(), "resolved");
    Ok(candidates)
}

/// Try each candidate in order; the first to accept wins.
async fn connect_first(
    address: &str,
    port: u16,
    candidates: &[SocketAddr],
) -> Result<TcpStream, ConnectError> {
    let mut last_error = None;

    for &candidate in candidates {
        let socket = TcpSocket::new_v4().map_err(|e| ConnectError::socket_open(&e))?;
        match socket.connect(candidate).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!(%candidate, %err, "candidate refused");
                last_error = Some(err);
            },
        }
    }

    Err(ConnectError::ConnectFailed {
        address: address.to_string(),
        port,
        reason: last_error.map_or_else(|| "no candidates".to_string(), |e| e.to_string()),
    })
}
