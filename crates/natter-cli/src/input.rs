//! Console input.
//!
//! Lines starting with `/` are commands; everything else is chat. Commands
//! that only read the [`SharedHistory`] are answered on the input thread;
//! the rest become [`Command`]s for the runtime.

use std::io::{self, BufRead, Write};

use natter_client::Command;
use natter_core::Notifier;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::console::{self, ConsolePrompt, SharedHistory};

/// Commands answered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Local {
    /// `/users`
    Users,
    /// `/urls`
    Urls,
    /// `/pms`
    PrivateMessages,
    /// `/clear`
    Clear,
    /// `/help`
    Help,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Forward to the runtime.
    Remote(Command),
    /// Answer from the history.
    Local(Local),
    /// Empty line; nothing to do.
    Blank,
}

/// Input parse errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// `/connect` without a host, or with too many arguments
    #[error("usage: /connect <host> [port] [keepalive]")]
    ConnectUsage,

    /// Port is not a number in 0..=65535
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// Third `/connect` argument is not `keepalive`
    #[error("expected `keepalive`, got: {0}")]
    InvalidFlag(String),

    /// Command name not recognised
    #[error("unknown command: /{0} (try /help)")]
    UnknownCommand(String),
}

/// Values `/connect` falls back to.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    /// Port when none is given
    pub port: u16,
    /// Keepalive when the flag is absent
    pub keep_alive: bool,
}

/// Parse one console line.
///
/// # Errors
///
/// Returns an [`InputError`] for malformed or unknown commands.
pub fn parse(line: &str, defaults: Defaults) -> Result<Input, InputError> {
    if line.is_empty() {
        return Ok(Input::Blank);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Input::Remote(Command::Send(line.to_string())));
    };

    if rest.starts_with('/') {
        return Ok(Input::Remote(Command::Send(rest.to_string())));
    }

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();

    match name {
        "connect" => parse_connect(words, defaults).map(Input::Remote),
        "disconnect" => Ok(Input::Remote(Command::Disconnect)),
        "quit" | "exit" => Ok(Input::Remote(Command::Quit)),
        "users" => Ok(Input::Local(Local::Users)),
        "urls" => Ok(Input::Local(Local::Urls)),
        "pms" => Ok(Input::Local(Local::PrivateMessages)),
        "clear" => Ok(Input::Local(Local::Clear)),
        "help" => Ok(Input::Local(Local::Help)),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

fn parse_connect<'a>(
    mut words: impl Iterator<Item = &'a str>,
    defaults: Defaults,
) -> Result<Command, InputError> {
    let address = words.next().ok_or(InputError::ConnectUsage)?;

    let port = match words.next() {
        Some(port) => port.parse().map_err(|_| InputError::InvalidPort(port.to_string()))?,
        None => defaults.port,
    };

    let keep_alive = match words.next() {
        Some("keepalive") => true,
        Some(other) => return Err(InputError::InvalidFlag(other.to_string())),
        None => defaults.keep_alive,
    };

    if words.next().is_some() {
        return Err(InputError::ConnectUsage);
    }

    Ok(Command::Connect { address: address.to_string(), port, keep_alive })
}

/// Title of the question asked before quitting.
pub const QUIT_TITLE: &str = "Quit";

/// Question asked before quitting.
pub const QUIT_QUESTION: &str = "Are You Sure?";

/// Read console lines until end of input or a confirmed `/quit`.
///
/// Blocking: run on a dedicated thread. Local commands and parse errors are
/// answered on the prompt's writer. `/quit` asks for confirmation first and
/// is dropped when declined. Sends [`Command::Quit`] on end of input, without
/// asking, so the runtime stops with the console.
pub fn read_console<R, W>(
    prompt: &mut ConsolePrompt<R, W>,
    commands: &mpsc::Sender<Command>,
    history: &SharedHistory,
    defaults: Defaults,
) where
    R: BufRead,
    W: Write,
{
    loop {
        let line = match prompt.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "console read failed");
                break;
            },
        };

        let command = match parse(&line, defaults) {
            Ok(Input::Remote(command)) => command,
            Ok(Input::Local(local)) => {
                report(console::show(prompt.out(), local, history));
                continue;
            },
            Ok(Input::Blank) => continue,
            Err(err) => {
                report(writeln!(prompt.out(), "{err}"));
                continue;
            },
        };

        let quit = command == Command::Quit;
        if quit && !prompt.confirm(QUIT_TITLE, QUIT_QUESTION) {
            debug!("quit declined");
            continue;
        }
        if commands.blocking_send(command).is_err() {
            debug!("runtime gone; stopping console");
            return;
        }
        if quit {
            return;
        }
    }

    if commands.blocking_send(Command::Quit).is_err() {
        debug!("runtime already stopped");
    }
}

fn report(result: io::Result<()>) {
    if let Err(err) = result {
        debug!(%err, "console write failed");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const DEFAULTS: Defaults = Defaults { port: 6666, keep_alive: false };

    fn connect(address: &str, port: u16, keep_alive: bool) -> Input {
        Input::Remote(Command::Connect { address: address.into(), port, keep_alive })
    }

    #[test]
    fn plain_lines_are_chat() {
        assert_eq!(parse("hello all", DEFAULTS), Ok(Input::Remote(Command::Send("hello all".into()))));
        assert_eq!(parse("//me waves", DEFAULTS), Ok(Input::Remote(Command::Send("/me waves".into()))));
        assert_eq!(parse("", DEFAULTS), Ok(Input::Blank));
    }

    #[test]
    fn connect_uses_defaults() {
        assert_eq!(parse("/connect talker.example", DEFAULTS), Ok(connect("talker.example", 6666, false)));
        assert_eq!(parse("/connect h 7777", DEFAULTS), Ok(connect("h", 7777, false)));
        assert_eq!(parse("/connect h 7777 keepalive", DEFAULTS), Ok(connect("h", 7777, true)));
    }

    #[test]
    fn connect_rejects_bad_arguments() {
        assert_eq!(parse("/connect", DEFAULTS), Err(InputError::ConnectUsage));
        assert_eq!(parse("/connect h port", DEFAULTS), Err(InputError::InvalidPort("port".into())));
        assert_eq!(parse("/connect h 1 2", DEFAULTS), Err(InputError::InvalidFlag("2".into())));
        assert_eq!(parse("/connect h 1 keepalive x", DEFAULTS), Err(InputError::ConnectUsage));
    }

    #[test]
    fn local_and_unknown_commands() {
        assert_eq!(parse("/users", DEFAULTS), Ok(Input::Local(Local::Users)));
        assert_eq!(parse("/pms", DEFAULTS), Ok(Input::Local(Local::PrivateMessages)));
        assert_eq!(parse("/quit", DEFAULTS), Ok(Input::Remote(Command::Quit)));
        assert_eq!(parse("/dance", DEFAULTS), Err(InputError::UnknownCommand("dance".into())));
    }

    fn run_console(input: &str) -> (Vec<Command>, String) {
        let (tx, mut rx) = mpsc::channel(8);
        let mut prompt = ConsolePrompt::new(Cursor::new(input.to_string()), Vec::new());

        read_console(&mut prompt, &tx, &SharedHistory::default(), DEFAULTS);

        let mut sent = Vec::new();
        while let Ok(command) = rx.try_recv() {
            sent.push(command);
        }
        (sent, String::from_utf8(prompt.out().clone()).unwrap())
    }

    #[test]
    fn console_forwards_commands_then_quits_at_eof() {
        let (sent, out) = run_console("/connect h\r\nhi\n/users\n/bogus\n");

        assert_eq!(sent, [
            Command::Connect { address: "h".into(), port: 6666, keep_alive: false },
            Command::Send("hi".into()),
            Command::Quit,
        ]);
        assert_eq!(out, "users: none\nunknown command: /bogus (try /help)\n");
    }

    #[test]
    fn confirmed_quit_stops_the_console() {
        let (sent, out) = run_console("/quit\ny\nnever sent\n");

        assert_eq!(sent, [Command::Quit]);
        assert_eq!(out, "Quit: Are You Sure? [y/N] ");
    }

    #[test]
    fn declined_quit_keeps_reading() {
        let (sent, out) = run_console("/exit\nn\nhi\n");

        assert_eq!(sent, [Command::Send("hi".into()), Command::Quit]);
        assert_eq!(out, "Quit: Are You Sure? [y/N] ");
    }

    #[test]
    fn unanswered_quit_still_stops_at_end_of_input() {
        let (sent, _) = run_console("/quit\n");

        assert_eq!(sent, [Command::Quit], "end of input still stops the runtime");
    }
}
