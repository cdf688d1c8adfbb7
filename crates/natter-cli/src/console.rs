//! Console presentation.
//!
//! [`ConsoleSink`] prints chat to a writer and keeps what the graphical
//! client would show in side windows (users, URLs, private messages) in a
//! [`History`] shared with the input thread, so `/users`, `/urls` and `/pms`
//! can be answered without going through the event loop.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use natter_core::{DisplaySink, Notifier};
use tracing::debug;

use crate::input::Local;

/// Help shown by `/help`.
pub const HELP: &str = "\
commands:
  /connect <host> [port] [keepalive]  open a connection
  /disconnect                         close the connection
  /users                              list present users
  /urls                               list collected URLs
  /pms                                list collected private messages
  /clear                              forget collected URLs and private messages
  /help                               show this text
  /quit                               exit after confirming
anything else is sent as chat; start a line with // to send a leading /";

/// Rows kept from a user list refresh. Later rows push out earlier ones.
pub const MAX_USERS: usize = 50;

/// URLs kept. The oldest is evicted first.
pub const MAX_URLS: usize = 50;

/// Private messages kept. The oldest is evicted first.
pub const MAX_PRIVATE_MESSAGES: usize = 100;

/// What the side windows would show.
#[derive(Debug, Default)]
pub struct History {
    users: Vec<(usize, String)>,
    urls: VecDeque<String>,
    private_messages: VecDeque<String>,
}

impl History {
    /// Users from the last roster refresh, in id order, at most
    /// [`MAX_USERS`].
    pub fn users(&self) -> &[(usize, String)] {
        &self.users
    }

    /// URLs seen since the last clear, at most [`MAX_URLS`].
    pub fn urls(&self) -> &VecDeque<String> {
        &self.urls
    }

    /// Private messages seen since the last clear, at most
    /// [`MAX_PRIVATE_MESSAGES`].
    pub fn private_messages(&self) -> &VecDeque<String> {
        &self.private_messages
    }

    fn push_user(&mut self, id: usize, name: &str) {
        if self.users.len() == MAX_USERS {
            self.users.remove(0);
        }
        self.users.push((id, name.to_string()));
    }

    fn push_url(&mut self, url: &str) {
        push_bounded(&mut self.urls, MAX_URLS, url);
    }

    fn push_private_message(&mut self, text: &str) {
        push_bounded(&mut self.private_messages, MAX_PRIVATE_MESSAGES, text);
    }

    /// Forget URLs and private messages. The user list is left alone.
    pub fn clear(&mut self) {
        self.urls.clear();
        self.private_messages.clear();
    }
}

fn push_bounded(entries: &mut VecDeque<String>, max: usize, entry: &str) {
    if entries.len() == max {
        entries.pop_front();
    }
    entries.push_back(entry.to_string());
}

/// History handle shared between the sink and the input thread.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory(Arc<Mutex<History>>);

impl SharedHistory {
    /// Lock the history. A poisoned lock is recovered; the data is plain text.
    pub fn lock(&self) -> MutexGuard<'_, History> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Format the user list line.
pub fn render_users(users: &[(usize, String)]) -> String {
    if users.is_empty() {
        return "users: none".to_string();
    }
    let names: Vec<String> = users.iter().map(|(id, name)| format!("{name}[{id}]")).collect();
    format!("users ({}): {}", users.len(), names.join(", "))
}

/// Answer a local command from the history.
///
/// # Errors
///
/// Returns the writer's error.
pub fn show<W: Write>(out: &mut W, local: Local, history: &SharedHistory) -> io::Result<()> {
    match local {
        Local::Help => writeln!(out, "{HELP}"),
        Local::Users => writeln!(out, "{}", render_users(history.lock().users())),
        Local::Urls => {
            let history = history.lock();
            if history.urls().is_empty() {
                return writeln!(out, "no URLs yet");
            }
            history.urls().iter().try_for_each(|url| writeln!(out, "{url}"))
        },
        Local::PrivateMessages => {
            let history = history.lock();
            if history.private_messages().is_empty() {
                return writeln!(out, "no private messages yet");
            }
            history.private_messages().iter().try_for_each(|text| writeln!(out, "{text}"))
        },
        Local::Clear => {
            history.lock().clear();
            writeln!(out, "cleared URLs and private messages")
        },
    }
}

/// Sink printing to a writer.
///
/// Chat lines arrive with their newline and are written verbatim. URLs and
/// private messages are written with a prefix. The user list is printed on
/// flush when a refresh happened since the last one.
#[derive(Debug)]
pub struct ConsoleSink<W: Write> {
    out: W,
    history: SharedHistory,
    users_changed: bool,
}

impl<W: Write> ConsoleSink<W> {
    /// Create a sink writing to `out` and recording into `history`.
    pub fn new(out: W, history: SharedHistory) -> Self {
        Self { out, history, users_changed: false }
    }

    /// Underlying writer.
    #[cfg(test)]
    pub fn out(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(err) = self.out.write_fmt(args) {
            debug!(%err, "console write failed");
        }
    }
}

impl<W: Write> DisplaySink for ConsoleSink<W> {
    fn append_chat_line(&mut self, text: &str) {
        self.emit(format_args!("{text}"));
    }

    fn append_url(&mut self, url: &str) {
        self.history.lock().push_url(url);
        self.emit(format_args!("[url] {url}\n"));
    }

    fn append_private_message(&mut self, text: &str) {
        self.history.lock().push_private_message(text);
        self.emit(format_args!("[pm] {text}\n"));
    }

    fn clear_user_list(&mut self) {
        self.history.lock().users.clear();
        self.users_changed = true;
    }

    fn append_user(&mut self, id: usize, name: &str) {
        self.history.lock().push_user(id, name);
        self.users_changed = true;
    }

    fn flush(&mut self) {
        if self.users_changed {
            self.users_changed = false;
            let line = render_users(self.history.lock().users());
            self.emit(format_args!("{line}\n"));
        }
        if let Err(err) = self.out.flush() {
            debug!(%err, "console flush failed");
        }
    }
}

/// Notifier writing `title: message` lines.
///
/// Has no input of its own, so confirmations are declined. Questions go
/// through [`ConsolePrompt`] on the input thread instead.
#[derive(Debug)]
pub struct ConsoleNotifier<W: Write> {
    out: W,
}

impl<W: Write> ConsoleNotifier<W> {
    /// Create a notifier writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Underlying writer.
    #[cfg(test)]
    pub fn out(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, title: &str, message: &str) {
        if let Err(err) = writeln!(self.out, "{title}: {message}") {
            debug!(%err, "notice write failed");
        }
    }
}

/// Interactive console: reads input lines and asks yes/no questions on the
/// same stream.
#[derive(Debug)]
pub struct ConsolePrompt<R: BufRead, W: Write> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Create a prompt reading from `input` and writing to `out`.
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Next input line without its terminator, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns the reader's error.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }

    /// Writer for command output.
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<R: BufRead, W: Write> Notifier for ConsolePrompt<R, W> {
    fn notify(&mut self, title: &str, message: &str) {
        if let Err(err) = writeln!(self.out, "{title}: {message}") {
            debug!(%err, "notice write failed");
        }
    }

    /// Accepts `y` or `yes` in any case. End of input declines.
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        let asked = write!(self.out, "{title}: {message} [y/N] ").and_then(|()| self.out.flush());
        if let Err(err) = asked {
            debug!(%err, "prompt write failed");
        }

        match self.next_line() {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                debug!(%err, "prompt read failed");
                false
            },
        }
    }
}
