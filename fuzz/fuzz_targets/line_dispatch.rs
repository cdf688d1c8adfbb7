//! Fuzz target for line framing and classification
//!
//! # Strategy
//!
//! Arbitrary bytes are split into one to four chunks and fed through a single
//! `FrameAssembler`, and every resulting line is classified.
//!
//! # Invariants
//!
//! - Lines never contain CR or LF and are never empty
//! - A URL match is a non-empty, whitespace-free substring of its line
//! - Chat is suppressed only for acks and roster lines
//! - NEVER panic on arbitrary input, including invalid UTF-8

#![no_main]

use libfuzzer_sys::fuzz_target;
use natter_proto::{Event, FrameAssembler, classify};

fuzz_target!(|input: (u8, &[u8])| {
    let (splits, data) = input;
    let chunk_len = data.len() / usize::from(splits % 4 + 1) + 1;

    let mut assembler = FrameAssembler::new();
    for chunk in data.chunks(chunk_len) {
        for line in assembler.assemble(chunk) {
            let text = line.as_str();
            assert!(!text.is_empty());
            assert!(!text.contains(['\r', '\n']));

            let events = classify(&line);
            let mut chat = false;
            for event in &events {
                match event {
                    Event::Url(url) => {
                        assert!(!url.is_empty());
                        assert!(!url.contains(char::is_whitespace));
                        assert!(text.contains(url));
                    }
                    Event::Chat(body) => {
                        assert_eq!(*body, text);
                        chat = true;
                    }
                    Event::UserJoined { .. } | Event::UserLeft { .. } | Event::PrivateMessage(_) => {}
                }
            }

            let suppressed = text.starts_with('@')
                || events.iter().any(|e| matches!(e, Event::UserJoined { .. } | Event::UserLeft { .. }));
            assert_eq!(chat, !suppressed);
        }
    }
});
