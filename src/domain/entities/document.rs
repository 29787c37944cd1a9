use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content types the ingestion path can read as text.
pub const TEXT_CONTENT_TYPES: [&str; 4] = [
    "text/plain",
    "text/markdown",
    "text/csv",
    "application/json",
];

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content_type: "text/plain".to_string(),
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_text(&self) -> bool {
        TEXT_CONTENT_TYPES.contains(&self.content_type.as_str())
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(document_id: Uuid, content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content: content.into(),
            chunk_index,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// 1-based source page, for paginated formats.
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Splits content into chunks of at most `chunk_size` characters.
///
/// Paragraphs are packed together first; a paragraph that is too long on its
/// own is split on line breaks, then on spaces, and finally on character
/// boundaries. Chunks are indexed sequentially from 0.
pub fn chunk_content(document_id: Uuid, content: &str, chunk_size: usize) -> Vec<DocumentChunk> {
    let chunk_size = chunk_size.max(1);

    split_recursive(content, chunk_size, &SEPARATORS)
        .into_iter()
        .enumerate()
        .map(|(index, text)| DocumentChunk::new(document_id, text, index))
        .collect()
}

/// Chunks each page separately so no chunk spans a page break. Pages are
/// numbered from 1 and chunk indexes run across the whole document.
pub fn chunk_pages(document_id: Uuid, pages: &[String], chunk_size: usize) -> Vec<DocumentChunk> {
    let chunk_size = chunk_size.max(1);

    pages
        .iter()
        .enumerate()
        .flat_map(|(page, text)| {
            split_recursive(text, chunk_size, &SEPARATORS)
                .into_iter()
                .map(move |content| (page + 1, content))
        })
        .enumerate()
        .map(|(index, (page, content))| {
            DocumentChunk::new(document_id, content, index)
                .with_metadata(ChunkMetadata { page: Some(page) })
        })
        .collect()
}

fn split_recursive(text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
    let Some((separator, rest)) = separators.split_first() else {
        return split_chars(text, chunk_size);
    };

    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in text.split(separator).map(str::trim).filter(|s| !s.is_empty()) {
        if piece.chars().count() > chunk_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_recursive(piece, chunk_size, rest));
            continue;
        }

        let would_exceed = !current.is_empty()
            && current.chars().count() + separator.len() + piece.chars().count() > chunk_size;

        if would_exceed {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push_str(separator);
        }
        current.push_str(piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn split_chars(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_content_single_chunk() {
        let doc_id = Uuid::new_v4();
        let content = "Hello world.\n\nThis is a test.";
        let chunks = chunk_content(doc_id, content, 100);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world.\n\nThis is a test.");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].document_id, doc_id);
    }

    #[test]
    fn test_chunk_content_multiple_chunks() {
        let doc_id = Uuid::new_v4();
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_content(doc_id, content, 30);

        assert_eq!(chunks.len(), 3);
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_long_paragraph_is_split_on_words() {
        let doc_id = Uuid::new_v4();
        let content = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = chunk_content(doc_id, content, 12);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 12));
        let rejoined: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(rejoined.join(" "), content);
    }

    #[test]
    fn test_unbroken_text_is_split_on_chars() {
        let doc_id = Uuid::new_v4();
        let chunks = chunk_content(doc_id, "abcdefghij", 4);

        let parts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(parts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunk_pages_tracks_page_numbers() {
        let doc_id = Uuid::new_v4();
        let pages = vec![
            "Refunds take five days.".to_string(),
            "   ".to_string(),
            "The office is in Lisbon.\n\nOpen nine to five.".to_string(),
        ];
        let chunks = chunk_pages(doc_id, &pages, 30);

        let layout: Vec<(usize, Option<usize>)> =
            chunks.iter().map(|c| (c.chunk_index, c.metadata.page)).collect();
        assert_eq!(layout, vec![(0, Some(1)), (1, Some(3)), (2, Some(3))]);
        assert_eq!(chunks[1].content, "The office is in Lisbon.");
    }

    #[test]
    fn test_chunk_content_empty() {
        let doc_id = Uuid::new_v4();
        assert!(chunk_content(doc_id, "", 100).is_empty());
        assert!(chunk_content(doc_id, "\n\n  \n\n", 100).is_empty());
    }

    #[test]
    fn test_text_content_types() {
        assert!(Document::new("a.txt").is_text());
        assert!(!Document::new("a.pdf")
            .with_content_type("application/pdf")
            .is_text());
    }
}
