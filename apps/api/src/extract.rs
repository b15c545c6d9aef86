//! Resume text extraction, keyed by file extension.
//!
//! Extraction is deliberately forgiving: a file we cannot read yields an
//! empty string, which the pipeline then rejects as an empty resume. Only
//! files outside the allowed extension set are rejected outright.

use tracing::warn;

/// Upload extensions accepted by the match endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "jpg", "jpeg", "png"];

/// Lowercased extension of `filename`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
}

pub fn is_allowed(filename: &str) -> bool {
    file_extension(filename).is_some_and(|extension| ALLOWED_EXTENSIONS.contains(&extension.as_str()))
}

/// Extracts plain text from an uploaded resume. Failures and formats with
/// no extractor installed produce an empty string rather than an error.
pub fn extract_text(filename: &str, data: &[u8]) -> String {
    match file_extension(filename).as_deref() {
        Some("pdf") => match pdf_extract::extract_text_from_mem(data) {
            Ok(text) => text,
            Err(e) => {
                warn!("failed to extract text from {filename}: {e}");
                String::new()
            }
        },
        Some("txt") => String::from_utf8_lossy(data).into_owned(),
        Some(extension) => {
            warn!("no text extractor available for .{extension} uploads");
            String::new()
        }
        None => String::new(),
    }
}
