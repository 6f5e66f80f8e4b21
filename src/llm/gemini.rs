use std::pin::Pin;

use futures::{ Stream, StreamExt };
use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::models::chat::{ ChatMessage, Role };
use super::LlmError;

pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct StreamChunk {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

fn parse_chunk(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<StreamChunk>(bytes)
        .ok()
        .and_then(|chunk| {
            chunk.candidates.first().and_then(|c| {
                c.content.parts.first().map(|p| p.text.clone())
            })
        })
}

/// Reassembles the objects of the streamed response array. The endpoint
/// pretty-prints the array, so one object spans many lines and may be split
/// anywhere across HTTP chunks; scanning bytes with a string-aware brace
/// depth counter is independent of that formatting. Structural bytes never
/// collide with UTF-8 continuation bytes, so multi-byte text survives
/// chunk boundaries too.
struct ChunkAssembler {
    object: Vec<u8>,
    depth: u32,
    in_string: bool,
    escaped: bool,
}

impl ChunkAssembler {
    fn new() -> Self {
        Self {
            object: Vec::new(),
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    /// Feed raw response bytes; returns the token text of every response
    /// object completed within them.
    fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut tokens = Vec::new();
        for &b in bytes {
            if self.depth == 0 {
                // Between objects: array brackets, commas, and whitespace
                // carry no payload.
                if b == b'{' {
                    self.object.clear();
                    self.object.push(b);
                    self.depth = 1;
                }
                continue;
            }

            self.object.push(b);
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match b {
                b'"' => self.in_string = true,
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        if let Some(tok) = parse_chunk(&self.object) {
                            tokens.push(tok);
                        }
                    }
                }
                _ => {}
            }
        }
        tokens
    }
}

fn build_request(messages: &[ChatMessage]) -> GenerateRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for msg in messages {
        let text = msg.content.as_text();
        match msg.role {
            Role::System => system_parts.push(Part { text }),
            Role::User => contents.push(Content {
                role: Some("user"),
                parts: vec![Part { text }],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model"),
                parts: vec![Part { text }],
            }),
        }
    }

    GenerateRequest {
        contents,
        system_instruction: if system_parts.is_empty() {
            None
        } else {
            Some(Content { role: None, parts: system_parts })
        },
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }

    /// Forward the conversation and stream back the model's token output.
    /// One attempt per call; any transport or API failure ends the stream.
    pub async fn stream_generate(&self, messages: &[ChatMessage]) -> Result<TokenStream, LlmError> {
        info!(
            "GeminiClient::stream_generate() → model={} turns={}",
            self.config.model,
            messages.len()
        );

        let payload = build_request(messages);
        let url = self.stream_url();
        let http = self.http.clone();
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let resp = match http.post(&url).json(&payload).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let _ = tx.send(Err(LlmError::Http(e))).await;
                    return;
                }
            };

            if let Err(e) = resp.error_for_status_ref() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                warn!("model api returned {}: {}", status, body);
                let _ = tx.send(Err(LlmError::Api(e.to_string()))).await;
                return;
            }

            let mut bytes = resp.bytes_stream();
            let mut assembler = ChunkAssembler::new();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(buf) => {
                        for tok in assembler.feed(&buf) {
                            if tx.send(Ok(tok)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::Http(e))).await;
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::MessageContent;

    #[test]
    fn assembles_compact_object() {
        let mut assembler = ChunkAssembler::new();
        let tokens = assembler.feed(
            br#"[{"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]},"#,
        );
        assert_eq!(tokens, vec!["Hello".to_string()]);
    }

    #[test]
    fn assembles_pretty_printed_multi_line_array() {
        // The REST endpoint pretty-prints its response array, one object
        // across many lines.
        let body = br#"[{
  "candidates": [
    {
      "content": {
        "parts": [
          {
            "text": "Hello"
          }
        ],
        "role": "model"
      }
    }
  ]
}
,
{
  "candidates": [
    {
      "content": {
        "parts": [
          {
            "text": " there"
          }
        ],
        "role": "model"
      }
    }
  ]
}
]"#;
        let mut assembler = ChunkAssembler::new();
        let tokens = assembler.feed(body);
        assert_eq!(tokens, vec!["Hello".to_string(), " there".to_string()]);
    }

    #[test]
    fn assembles_object_split_across_feeds() {
        let mut assembler = ChunkAssembler::new();
        let mut tokens = assembler.feed(b"[{\n  \"candidates\": [{\"content\": {\"parts\": [{\"te");
        assert!(tokens.is_empty());
        tokens = assembler.feed(b"xt\": \"Hi\"}], \"role\": \"model\"}}]\n}]");
        assert_eq!(tokens, vec!["Hi".to_string()]);
    }

    #[test]
    fn braces_and_quotes_inside_token_text_do_not_confuse_parsing() {
        let mut assembler = ChunkAssembler::new();
        let tokens = assembler.feed(
            br#"[{"candidates":[{"content":{"parts":[{"text":"fn main() { \"x}\" }"}]}}]}]"#,
        );
        assert_eq!(tokens, vec!["fn main() { \"x}\" }".to_string()]);
    }

    #[test]
    fn array_framing_alone_yields_nothing() {
        let mut assembler = ChunkAssembler::new();
        assert!(assembler.feed(b"[\n,\n]\n").is_empty());
    }

    #[test]
    fn maps_roles_and_collects_system_instruction() {
        let messages = vec![
            ChatMessage { role: Role::System, content: MessageContent::Text("be brief".into()) },
            ChatMessage::user("hi"),
            ChatMessage { role: Role::Assistant, content: MessageContent::Text("hello".into()) },
        ];
        let req = build_request(&messages);
        assert_eq!(req.contents.len(), 2);
        assert_eq!(req.contents[0].role, Some("user"));
        assert_eq!(req.contents[1].role, Some("model"));
        let system = req.system_instruction.unwrap();
        assert_eq!(system.parts[0].text, "be brief");
    }

    #[test]
    fn stream_url_includes_model_and_key() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: "k".into(),
            model: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/".into(),
        });
        assert_eq!(
            client.stream_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:streamGenerateContent?key=k"
        );
    }
}
