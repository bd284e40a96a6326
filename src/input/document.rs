//! Uploaded documents and their declared formats

use serde::{Deserialize, Serialize};

/// Declared format of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Anything else; carries the declared extension for error reporting
    Unknown(String),
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            other => DocumentFormat::Unknown(other.to_string()),
        }
    }

    /// Infer the format from a file name, the way an upload form would.
    pub fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Self::from_extension(ext),
            _ => DocumentFormat::Unknown(String::new()),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Docx => write!(f, "DOCX"),
            DocumentFormat::Unknown(ext) if ext.is_empty() => write!(f, "(no extension)"),
            DocumentFormat::Unknown(ext) => write!(f, ".{}", ext),
        }
    }
}

/// A resume as received: name, declared format and raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub format: DocumentFormat,
    pub raw_bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, format: DocumentFormat, raw_bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            raw_bytes,
        }
    }
}

/// Plain text pulled out of a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub document_name: String,
    pub text: String,
}

/// The job description every resume in a run is compared against.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub text: String,
}

impl JobDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
