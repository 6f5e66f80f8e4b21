use async_trait::async_trait;

use super::{ Attachment, AttachmentAdapter, AttachmentError, AttachmentStatus };

/// Images ride along in the message as-is; there is no text to extract.
pub struct ImageAttachmentAdapter;

impl ImageAttachmentAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageAttachmentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentAdapter for ImageAttachmentAdapter {
    fn accepts(&self, content_type: &str) -> bool {
        content_type.starts_with("image/")
    }

    async fn send(&self, attachment: &mut Attachment) -> Result<(), AttachmentError> {
        attachment.status = AttachmentStatus::Complete;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AttachmentFile;

    #[tokio::test]
    async fn completes_without_extracting_content() {
        let adapter = ImageAttachmentAdapter::new();
        let mut att = adapter
            .add(AttachmentFile {
                name: "photo.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            })
            .unwrap();
        adapter.send(&mut att).await.unwrap();
        assert_eq!(att.status, AttachmentStatus::Complete);
        assert!(att.content.is_none());
    }
}
