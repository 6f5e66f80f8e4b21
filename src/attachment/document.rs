use async_trait::async_trait;
use log::{ error, info };
use serde::Deserialize;

use crate::extract;
use super::{ Attachment, AttachmentAdapter, AttachmentError, AttachmentStatus };

const DOCX_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn accepts_document(content_type: &str) -> bool {
    content_type == "application/pdf"
        || content_type == DOCX_TYPE
        || content_type.starts_with("text/")
}

#[derive(Deserialize)]
struct ExtractTextResponse {
    text: String,
}

/// Bridges attachments to the chat pipeline by uploading the raw file to the
/// text-extraction endpoint and storing the returned text on the attachment.
pub struct RemoteDocumentAdapter {
    endpoint: String,
    http: reqwest::Client,
}

impl RemoteDocumentAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn extract_remote(&self, attachment: &Attachment) -> Result<String, AttachmentError> {
        let part = reqwest::multipart::Part::bytes(attachment.file.bytes.clone())
            .file_name(attachment.file.name.clone())
            .mime_str(&attachment.file.content_type)
            .map_err(|e| AttachmentError::Validation(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        if !resp.status().is_success() {
            return Err(AttachmentError::Processing(format!(
                "Failed to extract text: server returned {}",
                resp.status()
            )));
        }

        let body: ExtractTextResponse = resp.json().await?;
        Ok(body.text)
    }
}

#[async_trait]
impl AttachmentAdapter for RemoteDocumentAdapter {
    fn accepts(&self, content_type: &str) -> bool {
        accepts_document(content_type)
    }

    async fn send(&self, attachment: &mut Attachment) -> Result<(), AttachmentError> {
        match self.extract_remote(attachment).await {
            Ok(text) => {
                info!(
                    "extracted '{}' via {}: {} chars",
                    attachment.file.name,
                    self.endpoint,
                    text.len()
                );
                attachment.content = Some(text);
                attachment.status = AttachmentStatus::Complete;
                Ok(())
            }
            Err(e) => {
                error!("File processing error for '{}': {}", attachment.file.name, e);
                attachment.status = AttachmentStatus::Failed;
                Err(e)
            }
        }
    }
}

/// Same contract as [`RemoteDocumentAdapter`] with extraction done
/// in-process, trading the network round-trip for local CPU and memory.
/// Unrecognized types pass through as UTF-8 text, matching the server.
pub struct LocalDocumentAdapter;

impl LocalDocumentAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalDocumentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentAdapter for LocalDocumentAdapter {
    fn accepts(&self, content_type: &str) -> bool {
        accepts_document(content_type)
    }

    async fn send(&self, attachment: &mut Attachment) -> Result<(), AttachmentError> {
        match extract::extract_text(&attachment.file.bytes, &attachment.file.content_type) {
            Ok(text) => {
                attachment.content = Some(text);
                attachment.status = AttachmentStatus::Complete;
                Ok(())
            }
            Err(e) => {
                error!("File processing error for '{}': {}", attachment.file.name, e);
                attachment.status = AttachmentStatus::Failed;
                Err(AttachmentError::Processing(e.to_string()))
            }
        }
    }
}
