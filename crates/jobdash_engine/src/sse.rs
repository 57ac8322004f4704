//! Incremental decoder for `text/event-stream` bodies.
use bytes::{Buf, BytesMut};

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every frame it completed.
    ///
    /// Lines may be split across chunks; a partial trailing line stays
    /// buffered until the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line = self.buf.split_to(pos);
            self.buf.advance(1);
            let line = String::from_utf8_lossy(&line);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(frame) = self.feed_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn feed_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // `id` and `retry` are not used by the status channel.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: resume_prog").is_empty());
        assert!(decoder.push(b"ress\r\ndata: {\"progress\"").is_empty());
        let frames = decoder.push(b": 10}\r\n\r\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: "resume_progress".to_string(),
                data: "{\"progress\": 10}".to_string(),
            }]
        );
    }

    #[test]
    fn comments_are_skipped_and_data_lines_joined() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": keep-alive\n\ndata: a\ndata: b\n\nevent: x\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: "message".to_string(),
                data: "a\nb".to_string(),
            }]
        );
    }
}
