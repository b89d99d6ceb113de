//! Turns Ollama's newline-delimited JSON into text.
//!
//! Every upstream line is classified as a [`LineOutcome`]. Buffered callers
//! get the concatenation of all fragments, streaming callers get them one at
//! a time through [`SegmentBuffer`] as body chunks arrive.

use serde::Deserialize;
use tracing::debug;

use crate::metrics::CHUNKS_SKIPPED;

// One object of the upstream stream; everything but `response` is ignored.
#[derive(Deserialize)]
struct UpstreamChunk {
    response: Option<String>,
}

/// What a single upstream line contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Parsed and carried a `response` field
    Fragment(String),
    /// Parsed but had no `response` (e.g. the final `done` object)
    Empty,
    /// Not valid JSON; dropped
    Skipped,
}

pub fn parse_line(line: &str) -> LineOutcome {
    match serde_json::from_str::<UpstreamChunk>(line) {
        Ok(UpstreamChunk { response: Some(text) }) => LineOutcome::Fragment(text),
        Ok(_) => LineOutcome::Empty,
        Err(err) => {
            CHUNKS_SKIPPED.inc();
            debug!(error = %err, len = line.len(), "skipping malformed upstream line");
            LineOutcome::Skipped
        }
    }
}

/// Result of reshaping a whole buffered body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reshaped {
    pub text: String,
    pub skipped: usize,
}

/// Concatenate the `response` of every parseable non-blank line, in order.
pub fn concat_lines(body: &str) -> Reshaped {
    let mut out = Reshaped::default();
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        match parse_line(line) {
            LineOutcome::Fragment(text) => out.text.push_str(&text),
            LineOutcome::Empty => {}
            LineOutcome::Skipped => out.skipped += 1,
        }
    }
    out
}

/// Reassembles segments from arbitrarily split body chunks.
///
/// Segments end at a newline, so both blank-line separated objects and plain
/// NDJSON come out whole; blank segments are dropped. Splitting happens on
/// bytes, a `\n` never occurs inside a multi-byte UTF-8 sequence.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    pending: Vec<u8>,
}

impl SegmentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every segment it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete
            .split(|b| *b == b'\n')
            .filter_map(non_blank)
            .collect()
    }

    /// Whatever is left once the upstream closed the connection.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        non_blank(&rest)
    }
}

fn non_blank(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Fragments of the segments completed by `chunk`, in order.
pub fn fragments_of(buffer: &mut SegmentBuffer, chunk: &[u8]) -> Vec<String> {
    buffer
        .push(chunk)
        .iter()
        .filter_map(|segment| match parse_line(segment) {
            LineOutcome::Fragment(text) => Some(text),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        assert_eq!(
            parse_line(r#"{"response":"Hi","done":false}"#),
            LineOutcome::Fragment("Hi".into())
        );
        assert_eq!(parse_line(r#"{"done":true}"#), LineOutcome::Empty);
        assert_eq!(parse_line(r#"{"response":"#), LineOutcome::Skipped);
        assert_eq!(parse_line("not json"), LineOutcome::Skipped);
    }

    #[test]
    fn concatenates_in_order_and_counts_skips() {
        let body = concat!(
            "{\"response\":\"The\"}\n",
            "garbage\n",
            "\n",
            "{\"response\":\" sky\"}\n",
            "{\"response\":\" is\"}\n",
            "{\"done\":true,\"total_duration\":12}\n",
        );
        let out = concat_lines(body);
        assert_eq!(out.text, "The sky is");
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn single_buffered_object() {
        let body = r#"{"model":"llama3.2","response":"Hello","done":true}"#;
        assert_eq!(concat_lines(body).text, "Hello");
    }

    #[test]
    fn empty_body_gives_empty_text() {
        assert_eq!(concat_lines(""), Reshaped::default());
    }

    #[test]
    fn segments_survive_chunk_splits() {
        let mut buf = SegmentBuffer::new();
        assert!(buf.push(br#"{"respon"#).is_empty());
        assert_eq!(buf.push(b"se\":\"a\"}\n{\"response\":"), vec![r#"{"response":"a"}"#]);
        assert_eq!(buf.push(b"\"b\"}\n\n"), vec![r#"{"response":"b"}"#]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn blank_line_separated_segments() {
        let mut buf = SegmentBuffer::new();
        let segs = buf.push(b"{\"response\":\"x\"}\n\n{\"response\":\"y\"}\n\n");
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn trailing_segment_is_flushed() {
        let mut buf = SegmentBuffer::new();
        assert!(buf.push(br#"{"response":"tail"}"#).is_empty());
        assert_eq!(buf.finish().as_deref(), Some(r#"{"response":"tail"}"#));
    }

    #[test]
    fn multibyte_split_across_chunks() {
        let line = "{\"response\":\"héllo\"}\n".as_bytes();
        // split inside the two-byte 'é'
        let cut = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut buf = SegmentBuffer::new();
        assert!(fragments_of(&mut buf, &line[..cut]).is_empty());
        assert_eq!(fragments_of(&mut buf, &line[cut..]), vec!["héllo"]);
    }

    #[test]
    fn streamed_matches_buffered() {
        let body = "{\"response\":\"1\"}\n{bad\n{\"response\":\"2\"}\n\n{\"response\":\"3\"}\n{\"done\":true}";
        let mut buf = SegmentBuffer::new();
        let mut streamed = String::new();
        for chunk in body.as_bytes().chunks(5) {
            streamed.extend(fragments_of(&mut buf, chunk));
        }
        if let Some(LineOutcome::Fragment(t)) = buf.finish().map(|s| parse_line(&s)) {
            streamed.push_str(&t);
        }
        assert_eq!(streamed, concat_lines(body).text);
        assert_eq!(streamed, "123");
    }
}
