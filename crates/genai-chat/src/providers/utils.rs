use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use super::base::{Chunk, Usage};
use super::configs::VertexProviderConfig;
use crate::adapter::mime::OCTET_STREAM;
use crate::models::content::{ContentItem, Conversation};
use crate::models::part::Part;
use crate::models::role::Role;

/// Convert the internal conversation to vertex `contents`
pub fn conversation_to_vertex_spec(conversation: &Conversation) -> Vec<Value> {
    conversation
        .iter()
        .map(|item| {
            json!({
                "role": item.role.as_str(),
                "parts": item.parts.iter().map(part_to_vertex_spec).collect::<Vec<_>>(),
            })
        })
        .collect()
}

pub fn part_to_vertex_spec(part: &Part) -> Value {
    match part {
        Part::Text(text) => json!({ "text": text.text }),
        Part::Blob(blob) => json!({
            "inlineData": {
                "mimeType": blob.mime_type,
                "data": STANDARD.encode(&blob.data),
            }
        }),
    }
}

/// Full request body for streamGenerateContent
pub fn build_payload(conversation: &Conversation, config: &VertexProviderConfig) -> Value {
    let mut payload = json!({
        "contents": conversation_to_vertex_spec(conversation),
        "generationConfig": config.generation,
        "safetySettings": config.safety_settings,
    });

    if let Some(corpus) = &config.rag_corpus {
        payload["tools"] = json!([{
            "retrieval": {
                "vertexRagStore": {
                    "ragResources": [{ "ragCorpus": corpus }]
                }
            }
        }]);
    }

    payload
}

/// Convert one streamed vertex response into a chunk
///   only the first candidate is kept, and part kinds we cannot display are dropped
pub fn vertex_response_to_chunk(response: &Value) -> Result<Chunk> {
    if let Some(error) = response.get("error") {
        return Err(anyhow!("Vertex AI error: {}", error));
    }

    let content = response
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .map(content_from_vertex_spec)
        .transpose()?;

    Ok(Chunk {
        content,
        usage: response.get("usageMetadata").map(get_usage),
    })
}

fn content_from_vertex_spec(content: &Value) -> Result<ContentItem> {
    let role = content
        .get("role")
        .and_then(Value::as_str)
        .map(Role::from_history)
        .unwrap_or(Role::Model);

    let mut parts = Vec::new();
    for part in content
        .get("parts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            parts.push(Part::text(text));
        } else if let Some(inline) = part.get("inlineData") {
            let mime_type = inline
                .get("mimeType")
                .and_then(Value::as_str)
                .unwrap_or(OCTET_STREAM);
            let data = inline
                .get("data")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let bytes = STANDARD
                .decode(data)
                .map_err(|e| anyhow!("Invalid inline data in response: {}", e))?;
            parts.push(Part::blob(bytes, mime_type));
        } else {
            tracing::debug!("Skipping unsupported response part: {}", part);
        }
    }

    Ok(ContentItem::new(role, parts))
}

fn get_usage(usage: &Value) -> Usage {
    let count = |key: &str| usage.get(key).and_then(Value::as_i64).map(|v| v as i32);
    Usage::new(
        count("promptTokenCount"),
        count("candidatesTokenCount"),
        count("totalTokenCount"),
    )
}

/// Incremental decoder for `text/event-stream` bodies
///   bytes may arrive split anywhere, including inside a utf-8 sequence
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning the data of every event completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            self.handle_line(line.trim_end_matches(|c: char| c == '\r' || c == '\n'), &mut events);
        }
        events
    }

    /// Flush an event left unterminated at end of stream
    pub fn finish(&mut self) -> Option<String> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw);
            self.handle_line(line.trim_end_matches('\r'), &mut events);
        }
        self.handle_line("", &mut events);
        events.pop()
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<String>) {
        if line.is_empty() {
            if !self.data.is_empty() {
                events.push(self.data.join("\n"));
                self.data.clear();
            }
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data
                .push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        // comments, event names and ids carry nothing we use
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::{HarmBlockThreshold, SafetySetting};

    fn sample_conversation() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.push(ContentItem::user().with_text("preamble"));
        conversation.push(
            ContentItem::user()
                .with_text("what is this?")
                .with_blob(vec![0, 1, 2], "image/png"),
        );
        conversation.push(ContentItem::model().with_text("a goat"));
        conversation
    }

    #[test]
    fn test_conversation_to_vertex_spec() {
        let spec = conversation_to_vertex_spec(&sample_conversation());

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[0], json!({"role": "user", "parts": [{"text": "preamble"}]}));
        assert_eq!(
            spec[1]["parts"][1],
            json!({"inlineData": {"mimeType": "image/png", "data": "AAEC"}})
        );
        assert_eq!(spec[2]["role"], "model");
    }

    #[test]
    fn test_build_payload_with_retrieval() {
        let mut config = VertexProviderConfig::new("p", "global", "m");
        config.rag_corpus = Some("projects/p/locations/us-central1/ragCorpora/42".into());
        config.safety_settings = SafetySetting::all(HarmBlockThreshold::BlockOnlyHigh);

        let payload = build_payload(&sample_conversation(), &config);

        assert_eq!(payload["contents"].as_array().unwrap().len(), 3);
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 65535);
        assert_eq!(payload["generationConfig"]["topP"], 1.0);
        assert_eq!(payload["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(payload["safetySettings"][2]["threshold"], "BLOCK_ONLY_HIGH");
        assert_eq!(
            payload["tools"][0]["retrieval"]["vertexRagStore"]["ragResources"][0]["ragCorpus"],
            "projects/p/locations/us-central1/ragCorpora/42"
        );
    }

    #[test]
    fn test_build_payload_without_retrieval() {
        let config = VertexProviderConfig::new("p", "global", "m");
        let payload = build_payload(&sample_conversation(), &config);
        assert!(payload.get("tools").is_none());
    }

    #[test]
    fn test_vertex_response_to_chunk() -> Result<()> {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Goats are"},
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}},
                        {"functionCall": {"name": "lookup", "args": {}}}
                    ]
                }
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 3,
                "totalTokenCount": 15
            }
        });

        let chunk = vertex_response_to_chunk(&response)?;
        let content = chunk.content.expect("Expected content");
        assert_eq!(content.role, Role::Model);
        assert_eq!(
            content.parts,
            vec![Part::text("Goats are"), Part::blob(vec![1, 2, 3], "image/png")]
        );
        assert_eq!(chunk.usage, Some(Usage::new(Some(12), Some(3), Some(15))));
        Ok(())
    }

    #[test]
    fn test_vertex_response_without_candidates() -> Result<()> {
        let chunk = vertex_response_to_chunk(&json!({"usageMetadata": {}}))?;
        assert!(chunk.content.is_none());

        let chunk = vertex_response_to_chunk(&json!({"candidates": [{"finishReason": "STOP"}]}))?;
        assert!(chunk.content.is_none());
        Ok(())
    }

    #[test]
    fn test_vertex_error_response() {
        let result = vertex_response_to_chunk(&json!({"error": {"code": 429}}));
        assert!(result.unwrap_err().to_string().contains("Vertex AI error"));
    }

    #[test]
    fn test_sse_decoder_handles_split_events() {
        let mut decoder = SseDecoder::new();

        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert_eq!(decoder.push(b":1}\r\n\r\ndata: {\"b\":2}\n"), vec!["{\"a\":1}"]);
        assert_eq!(decoder.push(b"\n: keepalive\n\n"), vec!["{\"b\":2}"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_sse_decoder_handles_split_utf8_and_trailing_event() {
        let mut decoder = SseDecoder::new();
        let text = "data: chèvre".as_bytes();
        // split inside the two byte 'è'
        let (first, second) = text.split_at(9);

        assert!(decoder.push(first).is_empty());
        assert!(decoder.push(second).is_empty());
        assert_eq!(decoder.finish(), Some("chèvre".to_string()));
    }

    #[test]
    fn test_sse_decoder_joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        assert_eq!(
            decoder.push(b"event: message\ndata: one\ndata: two\n\n"),
            vec!["one\ntwo"]
        );
    }
}
