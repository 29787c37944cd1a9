use crate::domain::errors::DomainError;

/// Pulls plain text out of a binary document format.
pub trait TextExtractor: Send + Sync {
    /// Text of each page in order. Pages without text come back empty.
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, DomainError>;
}
