use super::ExtractionError;

/// Extract the text layers of a PDF as one concatenated string.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
}
