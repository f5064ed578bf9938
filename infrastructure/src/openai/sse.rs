//! Server-sent event decoding for streaming completions
//!
//! The completion endpoint streams `data: {json}` lines separated by blank
//! lines and ends with `data: [DONE]`. [`SseDecoder`] turns raw body chunks
//! into `data` payloads; [`parse_chunk`] turns a payload into text.
//! [`forward_events`] drives both and feeds a [`StreamEvent`] channel.

use super::error::{OpenAiError, Result};
use super::types::ChatCompletionChunk;
use docchat_domain::StreamEvent;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Terminal payload of a completion stream
pub const DONE_MARKER: &str = "[DONE]";

/// Incremental line decoder for an SSE body.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// characters split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every complete `data` payload in it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = Self::data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        Self::data_payload(&rest)
    }

    fn data_payload(line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        let data = line.strip_prefix("data:")?;
        Some(data.strip_prefix(' ').unwrap_or(data).to_string())
    }
}

/// What one `data` payload contributes to the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// A piece of reply text
    Delta(String),
    /// A chunk without text (role announcement, finish reason)
    Empty,
    /// The `[DONE]` terminator
    Done,
}

/// Interpret a single `data` payload.
pub fn parse_chunk(payload: &str) -> Result<ChunkOutcome> {
    let payload = payload.trim();
    if payload == DONE_MARKER {
        return Ok(ChunkOutcome::Done);
    }

    if let Ok(envelope) = serde_json::from_str::<super::types::ApiErrorEnvelope>(payload) {
        return Err(OpenAiError::Api {
            status: 200,
            message: envelope.error.message,
        });
    }

    let chunk: ChatCompletionChunk =
        serde_json::from_str(payload).map_err(|e| OpenAiError::ChunkParse {
            error: e.to_string(),
            raw: payload.to_string(),
        })?;

    let text: String = chunk
        .choices
        .into_iter()
        .filter_map(|choice| {
            if let Some(reason) = &choice.finish_reason {
                debug!("Completion finished: {}", reason);
            }
            choice.delta.content
        })
        .collect();

    if text.is_empty() {
        Ok(ChunkOutcome::Empty)
    } else {
        Ok(ChunkOutcome::Delta(text))
    }
}

/// Pump an SSE body into `tx` as [`StreamEvent`]s.
///
/// Always ends with exactly one terminal event (`Completed` or `Error`)
/// unless the receiver has been dropped.
pub async fn forward_events<S, B, E>(mut body: S, tx: mpsc::Sender<StreamEvent>)
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = SseDecoder::new();
    let mut full_text = String::new();

    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Completion stream interrupted: {}", e);
                let _ = tx
                    .send(StreamEvent::Error(format!("stream interrupted: {e}")))
                    .await;
                return;
            }
        };

        for payload in decoder.push(bytes.as_ref()) {
            if !handle_payload(&payload, &mut full_text, &tx).await {
                return;
            }
        }
    }

    if let Some(payload) = decoder.finish()
        && !handle_payload(&payload, &mut full_text, &tx).await
    {
        return;
    }

    // Body ended without [DONE]; deliver what arrived
    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

/// Returns `false` once the stream has reached a terminal state.
async fn handle_payload(
    payload: &str,
    full_text: &mut String,
    tx: &mpsc::Sender<StreamEvent>,
) -> bool {
    match parse_chunk(payload) {
        Ok(ChunkOutcome::Delta(text)) => {
            full_text.push_str(&text);
            tx.send(StreamEvent::Delta(text)).await.is_ok()
        }
        Ok(ChunkOutcome::Empty) => true,
        Ok(ChunkOutcome::Done) => {
            let _ = tx
                .send(StreamEvent::Completed(std::mem::take(full_text)))
                .await;
            false
        }
        Err(e) => {
            warn!("Bad completion stream chunk: {}", e);
            let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"index": 0, "delta": {"content": text}}]})
        )
    }

    async fn collect(parts: Vec<std::result::Result<Vec<u8>, String>>) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::channel(16);
        forward_events(futures::stream::iter(parts), tx).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn decoder_handles_split_lines() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert_eq!(decoder.push(b":1}\n\ndata: [DONE]\n"), vec!["{\"a\":1}", "[DONE]"]);
    }

    #[test]
    fn decoder_ignores_comments_and_event_names() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b": keep-alive\r\nevent: message\r\ndata: x\r\n\r\n");
        assert_eq!(payloads, vec!["x"]);
    }

    #[test]
    fn decoder_keeps_multibyte_characters_intact() {
        let line = "data: こんにちは\n".as_bytes();
        let (head, tail) = line.split_at(8); // inside the first character
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["こんにちは"]);
    }

    #[test]
    fn decoder_finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), Some("[DONE]".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn parse_chunk_variants() {
        assert_eq!(parse_chunk("[DONE]").unwrap(), ChunkOutcome::Done);
        assert_eq!(
            parse_chunk(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap(),
            ChunkOutcome::Delta("Hi".to_string())
        );
        assert_eq!(
            parse_chunk(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            ChunkOutcome::Empty
        );
        assert_eq!(
            parse_chunk(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap(),
            ChunkOutcome::Empty
        );
        assert!(matches!(
            parse_chunk("not json"),
            Err(OpenAiError::ChunkParse { .. })
        ));
        assert!(matches!(
            parse_chunk(r#"{"error":{"message":"overloaded"}}"#),
            Err(OpenAiError::Api { .. })
        ));
    }

    #[tokio::test]
    async fn forward_concatenates_deltas() {
        let body = format!("{}{}{}data: [DONE]\n\n", chunk("Hel"), chunk("lo"), chunk(", world"));
        let events = collect(vec![Ok(body.into_bytes())]).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hel".to_string()),
                StreamEvent::Delta("lo".to_string()),
                StreamEvent::Delta(", world".to_string()),
                StreamEvent::Completed("Hello, world".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn forward_stops_at_done() {
        let body = format!("{}data: [DONE]\n\n{}", chunk("a"), chunk("ignored"));
        let events = collect(vec![Ok(body.into_bytes())]).await;
        assert_eq!(events.last(), Some(&StreamEvent::Completed("a".to_string())));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn forward_reports_transport_failure() {
        let events = collect(vec![
            Ok(chunk("partial").into_bytes()),
            Err("connection reset".to_string()),
        ])
        .await;
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("partial".to_string()),
                StreamEvent::Error("stream interrupted: connection reset".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn forward_reports_malformed_chunk() {
        let events = collect(vec![Ok(b"data: {broken\n\n".to_vec())]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error(_)));
    }

    #[tokio::test]
    async fn forward_completes_when_body_ends_without_done() {
        let events = collect(vec![Ok(chunk("only").into_bytes())]).await;
        assert_eq!(events.last(), Some(&StreamEvent::Completed("only".to_string())));
    }
}
