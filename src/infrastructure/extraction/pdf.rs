use std::panic::{self, AssertUnwindSafe};

use crate::domain::{ports::TextExtractor, DomainError};

/// Per-page text from PDF files. Scanned pages without a text layer come
/// back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, DomainError> {
        // The parser panics on some malformed files instead of returning an error.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| DomainError::validation("PDF could not be parsed"))?;

        let pages =
            result.map_err(|e| DomainError::validation(format!("unreadable PDF: {e}")))?;
        tracing::debug!(pages = pages.len(), "pdf text extracted");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PAGES: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/two_pages.pdf"));

    #[test]
    fn test_extracts_text_per_page() {
        let pages = PdfTextExtractor::new().extract_pages(TWO_PAGES).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Refunds take five days."));
        assert!(pages[1].contains("The office is in Lisbon."));
    }

    #[test]
    fn test_garbage_is_validation_error() {
        let result = PdfTextExtractor::new().extract_pages(b"not a pdf at all");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
