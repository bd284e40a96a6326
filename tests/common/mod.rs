//! Shared fixtures: a deterministic embedding provider and in-memory documents

#![allow(dead_code)]

use resume_screener::input::document::{Document, DocumentFormat};
use resume_screener::processing::embeddings::{Embedding, EmbeddingProvider, ProviderError};
use std::io::{Cursor, Write};
use zip::write::FileOptions;

pub const DIMENSION: usize = 64;

/// Hashes each lowercase word into one of `DIMENSION` buckets.
pub struct BagOfWordsProvider;

pub fn fnv1a(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

impl EmbeddingProvider for BagOfWordsProvider {
    fn encode(&self, text: &str) -> Result<Embedding, ProviderError> {
        let mut vector = vec![0.0f32; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[(fnv1a(&word.to_lowercase()) % DIMENSION as u64) as usize] += 1.0;
        }
        Ok(Embedding::new(vector))
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Fails for any text mentioning "outage", like a model server going away.
pub struct FlakyProvider;

impl EmbeddingProvider for FlakyProvider {
    fn encode(&self, text: &str) -> Result<Embedding, ProviderError> {
        if text.contains("outage") {
            return Err(ProviderError("model unavailable".to_string()));
        }
        BagOfWordsProvider.encode(text)
    }

    fn model_name(&self) -> &str {
        "flaky"
    }
}

pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", FileOptions::default())
        .unwrap();
    writer
        .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    writer
        .start_file("word/document.xml", FileOptions::default())
        .unwrap();
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body
    )
    .unwrap();
    writer.finish().unwrap().into_inner()
}

/// A minimal single-font PDF with one page per entry; empty entries give blank pages.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    let mut objects: Vec<String> = Vec::new();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    );

    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        let content = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text)
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, object));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.into_bytes()
}

pub fn docx(name: &str, paragraphs: &[&str]) -> Document {
    Document::new(name, DocumentFormat::Docx, docx_bytes(paragraphs))
}

pub fn pdf(name: &str, pages: &[&str]) -> Document {
    Document::new(name, DocumentFormat::Pdf, pdf_bytes(pages))
}

pub fn corrupt_pdf(name: &str) -> Document {
    Document::new(name, DocumentFormat::Pdf, b"%PDF-1.7\n\x00\x01 truncated upload".to_vec())
}
