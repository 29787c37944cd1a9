mod pdf;

pub use pdf::PdfTextExtractor;
