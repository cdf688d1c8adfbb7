//! Presentation collaborators.
//!
//! The session never renders anything. Classified output goes to a
//! [`DisplaySink`]; dialogs go to a [`Notifier`]. Frontends implement both.
//!
//! [`RecordingSink`] and [`RecordingNotifier`] keep every call in order, for
//! headless use and for assertions in tests.

/// Receives classified, ready-to-render output.
///
/// The sink owns layout, scrollback, and styling. The user list has no
/// incremental primitive: every roster change is sent as
/// [`clear_user_list`](Self::clear_user_list) followed by one
/// [`append_user`](Self::append_user) per active slot in ascending id order.
pub trait DisplaySink {
    /// Chat line, including its trailing `\n`.
    fn append_chat_line(&mut self, text: &str);

    /// Link extracted from a line.
    fn append_url(&mut self, url: &str);

    /// Private message line, without terminator.
    fn append_private_message(&mut self, text: &str);

    /// Start of a user list refresh.
    fn clear_user_list(&mut self);

    /// One active user.
    fn append_user(&mut self, id: usize, name: &str);

    /// Called once after every inbound chunk has been dispatched.
    fn flush(&mut self) {}
}

/// Surfaces error and confirmation dialogs.
pub trait Notifier {
    /// Show `message` under `title`.
    fn notify(&mut self, title: &str, message: &str);

    /// Ask a yes/no question. Returns `true` for yes.
    ///
    /// Notifiers that cannot read an answer decline.
    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        false
    }
}

/// One recorded [`DisplaySink`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// [`DisplaySink::append_chat_line`]
    Chat(String),
    /// [`DisplaySink::append_url`]
    Url(String),
    /// [`DisplaySink::append_private_message`]
    PrivateMessage(String),
    /// [`DisplaySink::clear_user_list`]
    ClearUsers,
    /// [`DisplaySink::append_user`]
    User {
        /// Slot id
        id: usize,
        /// User name
        name: String,
    },
}

/// [`DisplaySink`] that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<DisplayEvent>,
    flushes: usize,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, oldest first.
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// Number of [`DisplaySink::flush`] calls.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
        self.flushes = 0;
    }

    /// Chat lines in arrival order.
    pub fn chat_lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Chat(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Links in arrival order.
    pub fn urls(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Url(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Private messages in arrival order.
    pub fn private_messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::PrivateMessage(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// User list as currently rendered: the users appended since the last
    /// clear.
    pub fn user_list(&self) -> Vec<(usize, &str)> {
        let start = self
            .events
            .iter()
            .rposition(|e| matches!(e, DisplayEvent::ClearUsers))
            .map_or(0, |pos| pos + 1);

        self.events[start..]
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::User { id, name } => Some((*id, name.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySink for RecordingSink {
    fn append_chat_line(&mut self, text: &str) {
        self.events.push(DisplayEvent::Chat(text.to_owned()));
    }

    fn append_url(&mut self, url: &str) {
        self.events.push(DisplayEvent::Url(url.to_owned()));
    }

    fn append_private_message(&mut self, text: &str) {
        self.events.push(DisplayEvent::PrivateMessage(text.to_owned()));
    }

    fn clear_user_list(&mut self) {
        self.events.push(DisplayEvent::ClearUsers);
    }

    fn append_user(&mut self, id: usize, name: &str) {
        self.events.push(DisplayEvent::User { id, name: name.to_owned() });
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// [`Notifier`] that records every call as `(title, message)`.
///
/// Confirmations are answered with a fixed answer, `false` unless set.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Vec<(String, String)>,
    questions: Vec<(String, String)>,
    answer: bool,
}

impl RecordingNotifier {
    /// Create an empty recorder that declines confirmations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty recorder that answers every confirmation with
    /// `answer`.
    pub fn answering(answer: bool) -> Self {
        Self { answer, ..Self::default() }
    }

    /// Change the answer given to later confirmations.
    pub fn set_answer(&mut self, answer: bool) {
        self.answer = answer;
    }

    /// Every confirmation asked, oldest first.
    pub fn questions(&self) -> &[(String, String)] {
        &self.questions
    }

    /// Every notice, oldest first.
    pub fn notices(&self) -> &[(String, String)] {
        &self.notices
    }

    /// Most recent notice.
    pub fn last(&self) -> Option<(&str, &str)> {
        self.notices.last().map(|(t, m)| (t.as_str(), m.as_str()))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        self.notices.push((title.to_owned(), message.to_owned()));
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.questions.push((title.to_owned(), message.to_owned()));
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_list_reflects_last_refresh() {
        let mut sink = RecordingSink::new();
        sink.append_user(9, "stale");
        assert_eq!(sink.user_list(), [(9, "stale")]);

        sink.clear_user_list();
        sink.append_user(1, "amy");
        sink.append_user(4, "bob");
        sink.append_chat_line("noise\n");

        assert_eq!(sink.user_list(), [(1, "amy"), (4, "bob")]);

        sink.clear_user_list();
        assert!(sink.user_list().is_empty());
    }

    #[test]
    fn channels_are_kept_apart() {
        let mut sink = RecordingSink::new();
        sink.append_chat_line("hi\n");
        sink.append_url("http://a.b");
        sink.append_private_message("<x> y");
        sink.flush();

        assert_eq!(sink.chat_lines(), ["hi\n"]);
        assert_eq!(sink.urls(), ["http://a.b"]);
        assert_eq!(sink.private_messages(), ["<x> y"]);
        assert_eq!(sink.flushes(), 1);

        sink.clear();
        assert!(sink.events().is_empty());
        assert_eq!(sink.flushes(), 0);
    }

    #[test]
    fn recording_notifier_answers_and_keeps_questions_apart() {
        let mut notifier = RecordingNotifier::answering(true);
        notifier.notify("Disconnected", "Connection Closed");

        assert!(notifier.confirm("Quit", "Are You Sure?"));
        notifier.set_answer(false);
        assert!(!notifier.confirm("Quit", "Are You Sure?"));

        assert_eq!(notifier.notices().len(), 1);
        assert_eq!(notifier.questions().len(), 2);
        assert!(!RecordingNotifier::new().confirm("Quit", "Are You Sure?"));
    }
}
