use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Message content is either a plain string or a list of typed parts.
/// Both shapes appear on the wire, hence the untagged representation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
}

impl MessageContent {
    /// Flatten to plain text for forwarding to the model.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|p| {
                    let ContentPart::Text { text } = p;
                    text.as_str()
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "extractedText", default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

impl ChatRequest {
    /// The message list forwarded to the model. When extracted document text
    /// is present it becomes exactly one additional trailing user turn.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let mut messages = self.messages;
        if let Some(text) = self.extracted_text {
            messages.push(ChatMessage::user(text));
        }
        messages
    }
}
