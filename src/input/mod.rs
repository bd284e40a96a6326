//! Input processing module
//! Handles uploaded documents, text extraction, and file loading

pub mod document;
pub mod text_extractor;
pub mod manager;

pub use document::{Document, DocumentFormat, ExtractedText, JobDescription};
pub use text_extractor::DocumentExtractor;
