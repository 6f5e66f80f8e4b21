use async_trait::async_trait;

use super::{ Attachment, AttachmentAdapter, AttachmentError, AttachmentFile };

/// Tries each adapter in order; the first whose accepted-type set matches
/// the file's declared media type handles it.
pub struct CompositeAttachmentAdapter {
    adapters: Vec<Box<dyn AttachmentAdapter>>,
}

impl CompositeAttachmentAdapter {
    pub fn new(adapters: Vec<Box<dyn AttachmentAdapter>>) -> Self {
        Self { adapters }
    }

    fn adapter_for(&self, content_type: &str) -> Result<&dyn AttachmentAdapter, AttachmentError> {
        self.adapters
            .iter()
            .find(|a| a.accepts(content_type))
            .map(|a| a.as_ref())
            .ok_or_else(|| {
                AttachmentError::Validation(format!("no adapter accepts '{}'", content_type))
            })
    }
}

#[async_trait]
impl AttachmentAdapter for CompositeAttachmentAdapter {
    fn accepts(&self, content_type: &str) -> bool {
        self.adapters.iter().any(|a| a.accepts(content_type))
    }

    fn add(&self, file: AttachmentFile) -> Result<Attachment, AttachmentError> {
        self.adapter_for(&file.content_type)?.add(file)
    }

    async fn send(&self, attachment: &mut Attachment) -> Result<(), AttachmentError> {
        self.adapter_for(&attachment.file.content_type)?
            .send(attachment)
            .await
    }

    fn remove(&self, attachment: &Attachment) {
        if let Ok(adapter) = self.adapter_for(&attachment.file.content_type) {
            adapter.remove(attachment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{
        AttachmentStatus, ImageAttachmentAdapter, LocalDocumentAdapter,
    };

    fn composite() -> CompositeAttachmentAdapter {
        CompositeAttachmentAdapter::new(vec![
            Box::new(ImageAttachmentAdapter::new()),
            Box::new(LocalDocumentAdapter::new()),
        ])
    }

    fn file(content_type: &str, bytes: &[u8]) -> AttachmentFile {
        AttachmentFile {
            name: "upload".to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn image_goes_to_image_adapter() {
        let composite = composite();
        let mut att = composite.add(file("image/png", b"\x89PNG")).unwrap();
        composite.send(&mut att).await.unwrap();
        // The image adapter completes without extracting text.
        assert_eq!(att.status, AttachmentStatus::Complete);
        assert!(att.content.is_none());
    }

    #[tokio::test]
    async fn text_goes_to_document_adapter() {
        let composite = composite();
        let mut att = composite.add(file("text/plain", b"hello world")).unwrap();
        composite.send(&mut att).await.unwrap();
        assert_eq!(att.content.as_deref(), Some("hello world"));
    }

    #[test]
    fn unhandled_type_is_a_validation_error() {
        let err = composite().add(file("video/mp4", b"...")).unwrap_err();
        assert!(matches!(err, AttachmentError::Validation(_)));
    }
}
