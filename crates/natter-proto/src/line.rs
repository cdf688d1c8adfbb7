//! Line framing.
//!
//! The transport hands over whatever the socket had buffered. A chunk may
//! hold several lines, `\r\n` or bare `\n` endings, and a partial line at the
//! end. [`FrameAssembler`] normalises that into [`ProtocolLine`]s.
//!
//! Every chunk is framed on its own: a line split across two reads comes out
//! as two lines.

use std::fmt;

use bytes::BytesMut;
use thiserror::Error;

/// Carriage return, stripped from every inbound chunk.
pub const CARRIAGE_RETURN: u8 = b'\r';

/// Line feed, the only line terminator.
pub const LINE_FEED: u8 = b'\n';

/// Rejected [`ProtocolLine`] construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Text contains a carriage return
    #[error("line contains a carriage return at byte {0}")]
    CarriageReturn(usize),

    /// Text contains a line feed
    #[error("line contains a line feed at byte {0}")]
    LineFeed(usize),
}

/// One logical protocol line, free of `\r` and `\n`.
///
/// The unit of dispatch: produced by [`FrameAssembler`] and consumed exactly
/// once by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolLine(String);

impl ProtocolLine {
    /// Wrap `text` as a line.
    ///
    /// # Errors
    ///
    /// - `LineError::CarriageReturn` if `text` contains `\r`
    /// - `LineError::LineFeed` if `text` contains `\n`
    pub fn new(text: impl Into<String>) -> Result<Self, LineError> {
        let text = text.into();

        if let Some(pos) = text.find('\r') {
            return Err(LineError::CarriageReturn(pos));
        }
        if let Some(pos) = text.find('\n') {
            return Err(LineError::LineFeed(pos));
        }

        Ok(Self(text))
    }

    /// Build a line from a framed segment. Invalid UTF-8 is replaced.
    fn from_segment(segment: &[u8]) -> Self {
        debug_assert!(!segment.contains(&CARRIAGE_RETURN));
        debug_assert!(!segment.contains(&LINE_FEED));

        Self(String::from_utf8_lossy(segment).into_owned())
    }

    /// Line text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the line, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ProtocolLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProtocolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ProtocolLine {
    type Error = LineError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

/// Splits raw chunks into [`ProtocolLine`]s.
///
/// Holds a working buffer that is reused across calls, so a long-lived
/// assembler stops allocating once it has seen its largest chunk.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: BytesMut,
}

impl FrameAssembler {
    /// Working buffer size matching the transport's read buffer.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Create an assembler with [`Self::DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an assembler with an initial working buffer of `capacity`
    /// bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: BytesMut::with_capacity(capacity) }
    }

    /// Frame one chunk.
    ///
    /// Deletes every `\r`, then splits on `\n`. Empty segments (consecutive
    /// line feeds, or the remainder after a final line feed) produce nothing.
    /// A non-empty remainder without a terminator is still a line.
    pub fn assemble(&mut self, chunk: &[u8]) -> Vec<ProtocolLine> {
        self.buffer.clear();
        if chunk.is_empty() {
            return Vec::new();
        }

        self.buffer.extend(chunk.iter().copied().filter(|&b| b != CARRIAGE_RETURN));

        self.buffer[..]
            .split(|&b| b == LINE_FEED)
            .filter(|segment| !segment.is_empty())
            .map(ProtocolLine::from_segment)
            .collect()
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
