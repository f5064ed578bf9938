//! Reply envelope parsing for blocking completions
//!
//! A blocking completion may return either plain text or a JSON object whose
//! `response` field holds the text to show. [`ReplyEnvelope::parse`] decides
//! which without treating malformed JSON as an error.
//!
//! A string `response` is used as-is; any other non-null value is rendered as
//! compact JSON. `"response": null` counts as absent.

use serde_json::Value;

/// The two shapes a blocking reply can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEnvelope {
    /// Anything that is not a JSON object with a non-null `response` field
    Plain(String),
    /// A JSON object carrying the reply in its `response` field
    Structured { response: String },
}

impl ReplyEnvelope {
    /// Classify the raw completion text, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(mut map)) => map.remove("response"),
            _ => None,
        };

        match response {
            Some(Value::String(text)) => ReplyEnvelope::Structured { response: text },
            Some(Value::Null) | None => ReplyEnvelope::Plain(trimmed.to_string()),
            Some(other) => ReplyEnvelope::Structured {
                response: other.to_string(),
            },
        }
    }

    /// The text to display and store in the transcript
    pub fn into_text(self) -> String {
        match self {
            ReplyEnvelope::Plain(text) => text,
            ReplyEnvelope::Structured { response } => response,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ReplyEnvelope::Structured { .. })
    }
}
