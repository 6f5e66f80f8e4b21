pub mod composite;
pub mod document;
pub mod image;

use async_trait::async_trait;
use log::info;
use thiserror::Error;
use uuid::Uuid;

pub use composite::CompositeAttachmentAdapter;
pub use document::{ LocalDocumentAdapter, RemoteDocumentAdapter };
pub use image::ImageAttachmentAdapter;

/// Attachment size ceiling: 10 MiB.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The caller supplied unusable input; resubmitting the same input will
    /// fail the same way.
    #[error("validation: {0}")]
    Validation(String),
    /// Extraction failed on the server or in-process; possibly transient.
    #[error("processing: {0}")]
    Processing(String),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}

impl AttachmentError {
    /// Validation failures are the caller's to fix; everything else may be
    /// worth retrying as-is.
    pub fn is_client_correctable(&self) -> bool {
        matches!(self, AttachmentError::Validation(_))
    }
}

#[derive(Clone, Debug)]
pub struct AttachmentFile {
    pub name: String,
    /// Declared media type; dispatch trusts it, extraction verifies it.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentStatus {
    /// Created, waiting for the composer to send it.
    RequiresAction,
    /// Extraction round-trip succeeded; content is set.
    Complete,
    /// Send failed; the attachment is unusable.
    Failed,
}

#[derive(Clone, Debug)]
pub struct Attachment {
    pub id: String,
    pub file: AttachmentFile,
    pub status: AttachmentStatus,
    pub content: Option<String>,
}

impl Attachment {
    fn new(file: AttachmentFile) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file,
            status: AttachmentStatus::RequiresAction,
            content: None,
        }
    }
}

#[async_trait]
pub trait AttachmentAdapter: Send + Sync {
    /// Whether this adapter handles files of the given declared media type.
    fn accepts(&self, content_type: &str) -> bool;

    /// Validate the file and create an attachment in `RequiresAction` state.
    /// Oversized files are rejected here, before any network or parser work.
    fn add(&self, file: AttachmentFile) -> Result<Attachment, AttachmentError> {
        if file.bytes.len() > MAX_FILE_SIZE {
            return Err(AttachmentError::Validation(format!(
                "File size exceeds {}MB limit",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        Ok(Attachment::new(file))
    }

    /// Run the extraction round-trip. On success the attachment becomes
    /// `Complete` with its content set; on failure it is left `Failed`.
    async fn send(&self, attachment: &mut Attachment) -> Result<(), AttachmentError>;

    /// No backing store exists, so removal is only a diagnostic log.
    fn remove(&self, attachment: &Attachment) {
        info!("Removing attachment: {}", attachment.file.name);
    }
}
