//! Applies classified protocol lines.
//!
//! [`natter_proto::classify`] decides what a line means; this module decides
//! where each piece goes. Roster events mutate the [`Roster`], which refreshes
//! the sink's user list itself. Everything else is forwarded to the sink as-is.

use natter_proto::{Event, ProtocolLine, classify};
use tracing::{debug, trace};

use crate::{roster::Roster, sink::DisplaySink};

/// Dispatch one line.
pub fn dispatch<S>(line: &ProtocolLine, roster: &mut Roster, sink: &mut S)
where
    S: DisplaySink + ?Sized,
{
    trace!(line = line.as_str(), "dispatching");

    for event in classify(line) {
        match event {
            Event::UserJoined { id, name } => {
                debug!(id, name, "user joined");
                roster.set_active(id, name, sink);
            },
            Event::UserLeft { id } => {
                debug!(id, "user left");
                roster.set_inactive(id, sink);
            },
            Event::PrivateMessage(text) => sink.append_private_message(text),
            Event::Url(url) => sink.append_url(url),
            Event::Chat(text) => {
                let mut rendered = String::with_capacity(text.len() + 1);
                rendered.push_str(text);
                rendered.push('\n');
                sink.append_chat_line(&rendered);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DisplayEvent, RecordingSink};

    fn run(lines: &[&str]) -> (Roster, RecordingSink) {
        let mut roster = Roster::new();
        let mut sink = RecordingSink::new();
        for text in lines {
            dispatch(&ProtocolLine::new(*text).unwrap(), &mut roster, &mut sink);
        }
        (roster, sink)
    }

    #[test]
    fn join_then_chat() {
        let (roster, sink) = run(&["+[3]bob", "hello"]);

        assert_eq!(roster.get(3), Some("bob"));
        assert_eq!(sink.events(), [
            DisplayEvent::ClearUsers,
            DisplayEvent::User { id: 3, name: "bob".into() },
            DisplayEvent::Chat("hello\n".into()),
        ]);
    }

    #[test]
    fn leave_clears_slot() {
        let (roster, sink) = run(&["+[3]bob", "-[3]"]);

        assert!(roster.is_empty());
        assert!(sink.user_list().is_empty());
        assert!(sink.chat_lines().is_empty());
    }

    #[test]
    fn ack_produces_nothing() {
        let (_, sink) = run(&["@ack"]);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn url_and_chat_both_fire() {
        let (_, sink) = run(&["check http://example.com now"]);

        assert_eq!(sink.events(), [
            DisplayEvent::Url("http://example.com".into()),
            DisplayEvent::Chat("check http://example.com now\n".into()),
        ]);
    }

    #[test]
    fn private_message_goes_to_both_views() {
        let (_, sink) = run(&["<amy> hi"]);

        assert_eq!(sink.private_messages(), ["<amy> hi"]);
        assert_eq!(sink.chat_lines(), ["<amy> hi\n"]);
    }

    #[test]
    fn out_of_range_join_is_dropped_silently() {
        let (roster, sink) = run(&["+[300]ghost"]);

        assert!(roster.is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn malformed_join_renders_as_chat() {
        let (roster, sink) = run(&["+[no]bob"]);

        assert!(roster.is_empty());
        assert_eq!(sink.chat_lines(), ["+[no]bob\n"]);
    }
}
