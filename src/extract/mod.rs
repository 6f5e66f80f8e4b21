mod docx;
mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("file is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Which parser handles an upload, decided by its declared media type.
/// `Raw` is the deliberate fallback: unrecognized types are passed through
/// as UTF-8 text rather than rejected or silently emptied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Raw,
}

impl DocumentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type {
            "application/pdf" => DocumentKind::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                DocumentKind::Docx
            }
            _ => DocumentKind::Raw,
        }
    }
}

/// Extract plain text from file bytes based on the declared media type.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractionError> {
    match DocumentKind::from_content_type(content_type) {
        DocumentKind::Pdf => pdf::extract_pdf(bytes),
        DocumentKind::Docx => docx::extract_docx(bytes),
        DocumentKind::Raw => Ok(std::str::from_utf8(bytes)?.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_declared_media_type() {
        assert_eq!(DocumentKind::from_content_type("application/pdf"), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_content_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            DocumentKind::Docx
        );
        assert_eq!(DocumentKind::from_content_type("text/plain"), DocumentKind::Raw);
        assert_eq!(DocumentKind::from_content_type("application/json"), DocumentKind::Raw);
    }

    #[test]
    fn raw_passthrough_round_trips_ascii() {
        let text = extract_text(b"hello world", "text/plain").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn raw_passthrough_rejects_invalid_utf8() {
        let err = extract_text(&[0xff, 0xfe, 0x00], "application/octet-stream").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUtf8(_)));
    }

    #[test]
    fn corrupt_pdf_is_an_error_not_empty_text() {
        let err = extract_text(b"not a pdf at all", "application/pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }
}
