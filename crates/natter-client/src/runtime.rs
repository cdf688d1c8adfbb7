//! Event loop driving a [`ConnectionManager`].
//!
//! Three event sources are multiplexed with `tokio::select!`:
//! - user [`Command`]s from a channel
//! - socket reads, while connected
//! - the keepalive timer, while armed
//!
//! The loop runs until [`Command::Quit`] arrives or every command sender is
//! dropped.

use natter_core::{DisplaySink, Environment, Notifier};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::transport::ConnectionManager;

/// Requests from the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a connection.
    Connect {
        /// Host name or address
        address: String,
        /// TCP port
        port: u16,
        /// Arm the keepalive timer
        keep_alive: bool,
    },
    /// Close the connection.
    Disconnect,
    /// Send a chat line.
    Send(String),
    /// Stop the loop.
    Quit,
}

/// Runtime owning the manager and the command channel.
pub struct Runtime<E, D, N>
where
    E: Environment,
    D: DisplaySink,
    N: Notifier,
{
    manager: ConnectionManager<E, D, N>,
    commands: mpsc::Receiver<Command>,
}

impl<E, D, N> Runtime<E, D, N>
where
    E: Environment,
    D: DisplaySink,
    N: Notifier,
{
    /// Create a runtime reading from `commands`.
    pub fn new(manager: ConnectionManager<E, D, N>, commands: mpsc::Receiver<Command>) -> Self {
        Self { manager, commands }
    }

    /// Create a runtime together with the sender feeding it.
    pub fn channel(
        manager: ConnectionManager<E, D, N>,
        capacity: usize,
    ) -> (mpsc::Sender<Command>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(manager, rx))
    }

    /// Run the event loop.
    ///
    /// Disconnects on the way out and hands the manager back, so callers can
    /// inspect the final state.
    pub async fn run(mut self) -> ConnectionManager<E, D, N> {
        let env = self.manager.env().clone();
        let period = self.manager.session().keepalive().interval();

        let timer = env.sleep(period);
        tokio::pin!(timer);

        info!("runtime started");

        loop {
            let connected = self.manager.is_connected();
            let armed = self.manager.session().keepalive().is_armed();

            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("command channel closed");
                        break;
                    };
                    match command {
                        Command::Connect { address, port, keep_alive } => {
                            let opened = self.manager.connect(&address, port, keep_alive).await;
                            if opened.is_ok() && self.manager.session().keepalive().is_armed() {
                                timer.set(env.sleep(period));
                            }
                        },
                        Command::Disconnect => self.manager.disconnect(),
                        Command::Send(line) => self.manager.send(&line).await,
                        Command::Quit => break,
                    }
                },
                outcome = self.manager.receive(), if connected => {
                    trace!(?outcome, "read");
                },
                () = &mut timer, if armed => {
                    self.manager.keepalive_tick().await;
                    timer.set(env.sleep(period));
                },
            }
        }

        self.manager.disconnect();
        info!("runtime stopped");

        self.manager
    }
}
