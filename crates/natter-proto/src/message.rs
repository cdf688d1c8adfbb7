//! Message classification.
//!
//! A line can carry several events at once: a private message containing a
//! link yields both a [`Event::PrivateMessage`] and an [`Event::Url`], and
//! the same line is still rendered as chat. Only acknowledgements and
//! well-formed roster lines suppress chat rendering.

use crate::ProtocolLine;

/// Server acknowledgement, never rendered.
pub const ACK_PREFIX: char = '@';

/// Roster line announcing a present user: `+[<id>]<name>`.
pub const JOIN_PREFIX: &str = "+[";

/// Roster line announcing a departed user: `-[<id>]`.
pub const LEAVE_PREFIX: &str = "-[";

/// Private message payload.
pub const PRIVATE_PREFIX: char = '<';

/// Number of leading bytes searched for the `]` closing a roster id.
pub const SCAN_WINDOW: usize = 10;

const URL_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Event carried by a protocol line, borrowing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// User occupies slot `id`.
    UserJoined {
        /// Slot id as sent by the server. Not range checked.
        id: i64,
        /// Everything after the closing bracket.
        name: &'a str,
    },

    /// Slot `id` is free again.
    UserLeft {
        /// Slot id as sent by the server. Not range checked.
        id: i64,
    },

    /// Whole line, for the private message view.
    PrivateMessage(&'a str),

    /// First link in the line, up to the next whitespace.
    Url(&'a str),

    /// Whole line, for the chat view.
    Chat(&'a str),
}

/// Classify one line.
///
/// Checks run in a fixed order and every match contributes an event:
///
/// 1. `@` prefix suppresses chat
/// 2. `+[<id>]<name>` yields [`Event::UserJoined`] and suppresses chat
/// 3. `-[<id>]` yields [`Event::UserLeft`] and suppresses chat
/// 4. `<` prefix yields [`Event::PrivateMessage`]
/// 5. a link yields [`Event::Url`]
/// 6. unless suppressed, [`Event::Chat`]
///
/// A roster line without `]` inside [`SCAN_WINDOW`], or whose id is not an
/// integer, is not a roster event and renders as chat.
pub fn classify(line: &ProtocolLine) -> Vec<Event<'_>> {
    let text = line.as_str();
    let mut events = Vec::new();
    let mut render = !text.starts_with(ACK_PREFIX);

    if let Some((id, name)) = parse_slot(text, JOIN_PREFIX) {
        events.push(Event::UserJoined { id, name });
        render = false;
    }

    if let Some((id, _)) = parse_slot(text, LEAVE_PREFIX) {
        events.push(Event::UserLeft { id });
        render = false;
    }

    if text.starts_with(PRIVATE_PREFIX) {
        events.push(Event::PrivateMessage(text));
    }

    if let Some(url) = find_url(text) {
        events.push(Event::Url(url));
    }

    if render {
        events.push(Event::Chat(text));
    }

    events
}

/// First `http://` link in `text`, or failing that the first `https://` link,
/// cut at the next whitespace.
pub fn find_url(text: &str) -> Option<&str> {
    let start = URL_SCHEMES.iter().find_map(|scheme| text.find(scheme))?;
    let tail = &text[start..];
    let end = tail.find(char::is_whitespace).unwrap_or(tail.len());

    Some(&tail[..end])
}

/// Parse `<prefix><id>]<rest>` where `]` sits inside the scan window.
fn parse_slot<'a>(text: &'a str, prefix: &str) -> Option<(i64, &'a str)> {
    if !text.starts_with(prefix) {
        return None;
    }

    let window = &text.as_bytes()[..text.len().min(SCAN_WINDOW)];
    let close = window.iter().skip(prefix.len()).position(|&b| b == b']')? + prefix.len();

    // Both bounds sit next to ASCII bytes, so they are char boundaries.
    let id = text[prefix.len()..close].trim().parse().ok()?;

    Some((id, &text[close + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> ProtocolLine {
        ProtocolLine::new(text).unwrap()
    }

    #[test]
    fn plain_line_is_chat() {
        let l = line("hello");
        assert_eq!(classify(&l), [Event::Chat("hello")]);
    }

    #[test]
    fn ack_is_silent() {
        let l = line("@ack");
        assert!(classify(&l).is_empty());
    }

    #[test]
    fn join_registers_and_suppresses_chat() {
        let l = line("+[3]bob");
        assert_eq!(classify(&l), [Event::UserJoined { id: 3, name: "bob" }]);
    }

    #[test]
    fn join_name_keeps_everything_after_bracket() {
        let l = line("+[12]  the ] king");
        assert_eq!(classify(&l), [Event::UserJoined { id: 12, name: "  the ] king" }]);
    }

    #[test]
    fn leave_ignores_trailing_text() {
        let l = line("-[7]bob");
        assert_eq!(classify(&l), [Event::UserLeft { id: 7 }]);
    }

    #[test]
    fn out_of_range_ids_still_parse() {
        let l = line("-[-1]");
        assert_eq!(classify(&l), [Event::UserLeft { id: -1 }]);
    }

    #[test]
    fn bracket_outside_window_falls_through_to_chat() {
        // `]` at byte 10 is one past the window.
        let l = line("+[12345678]bob");
        assert_eq!(classify(&l), [Event::Chat("+[12345678]bob")]);

        let l = line("+[1234567]bob");
        assert_eq!(classify(&l), [Event::UserJoined { id: 1_234_567, name: "bob" }]);
    }

    #[test]
    fn non_numeric_id_falls_through_to_chat() {
        let l = line("+[bob]hi");
        assert_eq!(classify(&l), [Event::Chat("+[bob]hi")]);

        let l = line("-[");
        assert_eq!(classify(&l), [Event::Chat("-[")]);
    }

    #[test]
    fn private_message_is_also_chat() {
        let l = line("<alice> psst");
        assert_eq!(classify(&l), [Event::PrivateMessage("<alice> psst"), Event::Chat("<alice> psst")]);
    }

    #[test]
    fn url_stops_at_whitespace_and_keeps_chat() {
        let l = line("check http://example.com now");
        assert_eq!(classify(&l), [
            Event::Url("http://example.com"),
            Event::Chat("check http://example.com now"),
        ]);
    }

    #[test]
    fn url_runs_to_end_of_line() {
        assert_eq!(find_url("see https://example.com/a?b=c"), Some("https://example.com/a?b=c"));
        assert_eq!(find_url("tab\thttp://x.y\tz"), Some("http://x.y"));
        assert_eq!(find_url("no links here"), None);
    }

    #[test]
    fn plain_http_wins_over_earlier_https() {
        assert_eq!(find_url("https://secure.example then http://plain.example"), Some("http://plain.example"));
    }

    #[test]
    fn private_message_with_link_fires_everything() {
        let l = line("<amy> look https://x.io");
        assert_eq!(classify(&l), [
            Event::PrivateMessage("<amy> look https://x.io"),
            Event::Url("https://x.io"),
            Event::Chat("<amy> look https://x.io"),
        ]);
    }

    #[test]
    fn ack_with_link_still_surfaces_link() {
        let l = line("@see http://a.b");
        assert_eq!(classify(&l), [Event::Url("http://a.b")]);
    }
}
