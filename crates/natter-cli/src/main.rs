//! Console talker client.
//!
//! # Usage
//!
//! ```bash
//! # Start idle, then `/connect talker.example 6666 keepalive`
//! natter
//!
//! # Connect at startup with the keepalive enabled
//! natter --address talker.example --port 6666 --keep-alive
//! ```
//!
//! Chat goes to stdout. Notices and logs go to stderr.

mod console;
mod input;

use std::{io, thread, time::Duration};

use clap::Parser;
use natter_client::{ClientConfig, Command, ConnectionManager, Runtime, SessionConfig, SystemEnv};
use natter_core::{DEFAULT_ANNOUNCEMENT, DEFAULT_KEEPALIVE_INTERVAL};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    console::{ConsoleNotifier, ConsolePrompt, ConsoleSink, SharedHistory},
    input::Defaults,
};

/// Commands buffered between the console thread and the runtime.
const COMMAND_BUFFER: usize = 32;

/// Console client for line-based talkers
#[derive(Parser, Debug)]
#[command(name = "natter")]
#[command(about = "Console client for line-based TCP talkers")]
#[command(version)]
struct Args {
    /// Talker to connect to at startup
    #[arg(short, long)]
    address: Option<String>,

    /// Talker port
    #[arg(short, long, default_value_t = 6666)]
    port: u16,

    /// Send an empty line when the connection has been idle
    #[arg(short, long)]
    keep_alive: bool,

    /// Seconds between keepalive checks
    #[arg(long, default_value_t = DEFAULT_KEEPALIVE_INTERVAL.as_secs())]
    keep_alive_secs: u64,

    /// Line sent right after connecting
    #[arg(long, default_value = DEFAULT_ANNOUNCEMENT)]
    announce: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            session: SessionConfig {
                announcement: self.announce.clone(),
                keepalive_interval: Duration::from_secs(self.keep_alive_secs.max(1)),
            },
            ..ClientConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let history = SharedHistory::default();
    let manager = ConnectionManager::new(
        SystemEnv::new(),
        args.client_config(),
        ConsoleSink::new(io::stdout(), history.clone()),
        ConsoleNotifier::new(io::stderr()),
    );
    let (commands, runtime) = Runtime::channel(manager, COMMAND_BUFFER);

    if let Some(address) = args.address.clone() {
        commands.send(Command::Connect { address, port: args.port, keep_alive: args.keep_alive }).await?;
    }

    let defaults = Defaults { port: args.port, keep_alive: args.keep_alive };
    // Blocking stdin reads stay off the runtime so shutdown never waits on them.
    thread::Builder::new().name("console-input".into()).spawn(move || {
        let mut prompt = ConsolePrompt::new(io::stdin().lock(), io::stdout());
        input::read_console(&mut prompt, &commands, &history, defaults);
    })?;

    tracing::info!("natter started; /help lists commands");

    runtime.run().await;

    Ok(())
}
