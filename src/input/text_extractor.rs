//! Text extraction from PDF and DOCX resumes

use crate::error::ExtractionError;
use crate::input::document::{Document, DocumentFormat, ExtractedText};
use log::{debug, warn};
use regex::{Captures, Regex};
use std::io::{Cursor, Read};
use std::panic;

type ExtractResult<T> = std::result::Result<T, ExtractionError>;

/// A format-specific parser that splits a document into text units
/// (pages for PDF, paragraphs for DOCX), in document order.
pub trait TextExtractor: Send + Sync {
    fn text_units(&self, bytes: &[u8]) -> ExtractResult<Vec<String>>;

    fn extract(&self, document: &Document) -> ExtractResult<ExtractedText> {
        let units = self.text_units(&document.raw_bytes)?;
        let text = join_units(units)?;
        Ok(ExtractedText {
            document_name: document.name.clone(),
            text,
        })
    }
}

/// Join non-empty units with a single space. No non-empty unit at all is an error.
pub fn join_units(units: Vec<String>) -> ExtractResult<String> {
    let kept: Vec<String> = units
        .into_iter()
        .map(|unit| unit.trim().to_string())
        .filter(|unit| !unit.is_empty())
        .collect();

    if kept.is_empty() {
        return Err(ExtractionError::EmptyContent);
    }
    Ok(kept.join(" "))
}

/// Turn a parser panic into `CorruptDocument`. The process-wide panic hook
/// still prints its message to stderr before the unwind is caught.
fn catch_parser_panic<T>(parse: impl FnOnce() -> T + panic::UnwindSafe) -> ExtractResult<T> {
    panic::catch_unwind(parse).map_err(|_| {
        warn!("Document parser panicked; the panic message on stderr belongs to this document");
        ExtractionError::CorruptDocument("parser aborted on malformed input".to_string())
    })
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn text_units(&self, bytes: &[u8]) -> ExtractResult<Vec<String>> {
        // pdf-extract panics on some malformed inputs
        let parsed = catch_parser_panic(|| pdf_extract::extract_text_from_mem_by_pages(bytes))?;

        let pages = parsed.map_err(|e| {
            ExtractionError::CorruptDocument(format!("Failed to parse PDF: {}", e))
        })?;
        debug!("PDF parsed into {} pages", pages.len());
        Ok(pages)
    }
}

pub struct DocxExtractor {
    token_regex: Regex,
    entity_regex: Regex,
}

const DOCUMENT_PART: &str = "word/document.xml";

impl DocxExtractor {
    pub fn new() -> Self {
        // Text runs, run-level tabs and breaks, and paragraph boundaries of WordprocessingML
        let token_regex = Regex::new(
            r#"(?s)<w:t(?:\s[^>]*)?>(?P<text>.*?)</w:t>|<w:t(?:\s[^>]*)?/>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>|</w:p>|<w:p(?:\s[^>]*)?/?>"#,
        )
        .expect("Invalid DOCX token regex");

        let entity_regex = Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);")
            .expect("Invalid XML entity regex");

        Self {
            token_regex,
            entity_regex,
        }
    }

    /// Split `word/document.xml` into paragraph texts.
    fn paragraphs(&self, xml: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current = String::new();

        for caps in self.token_regex.captures_iter(xml) {
            if let Some(text) = caps.name("text") {
                current.push_str(&self.decode_entities(text.as_str()));
                continue;
            }

            let token = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            if token == "</w:p>" || (token.starts_with("<w:p") && token.ends_with("/>")) {
                paragraphs.push(std::mem::take(&mut current));
            } else if token.starts_with("<w:p") {
                if !current.is_empty() {
                    paragraphs.push(std::mem::take(&mut current));
                }
            } else if token.starts_with("<w:tab") {
                current.push('\t');
            } else if token.starts_with("<w:br") || token.starts_with("<w:cr") {
                current.push('\n');
            }
        }

        if !current.is_empty() {
            paragraphs.push(current);
        }
        paragraphs
    }

    /// Each reference is decoded exactly once, so `&amp;lt;` stays `&lt;`.
    fn decode_entities(&self, text: &str) -> String {
        self.entity_regex
            .replace_all(text, |caps: &Captures| {
                let reference = &caps[1];
                let decoded = match reference {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "amp" => Some('&'),
                    _ => {
                        let code = match reference.strip_prefix("#x") {
                            Some(hex) => u32::from_str_radix(hex, 16).ok(),
                            None => reference[1..].parse::<u32>().ok(),
                        };
                        code.and_then(char::from_u32)
                    }
                };
                decoded
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxExtractor {
    fn text_units(&self, bytes: &[u8]) -> ExtractResult<Vec<String>> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            ExtractionError::CorruptDocument(format!("Not a DOCX archive: {}", e))
        })?;

        let mut xml = String::new();
        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
            ExtractionError::CorruptDocument(format!("Missing {}: {}", DOCUMENT_PART, e))
        })?;
        part.read_to_string(&mut xml).map_err(|e| {
            ExtractionError::CorruptDocument(format!("Unreadable {}: {}", DOCUMENT_PART, e))
        })?;

        let paragraphs = self.paragraphs(&xml);
        debug!("DOCX parsed into {} paragraphs", paragraphs.len());
        Ok(paragraphs)
    }
}

/// Routes a document to the extractor for its declared format.
pub struct DocumentExtractor {
    pdf: PdfExtractor,
    docx: DocxExtractor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self {
            pdf: PdfExtractor,
            docx: DocxExtractor::new(),
        }
    }

    pub fn extractor_for(&self, format: &DocumentFormat) -> ExtractResult<&dyn TextExtractor> {
        match format {
            DocumentFormat::Pdf => Ok(&self.pdf),
            DocumentFormat::Docx => Ok(&self.docx),
            DocumentFormat::Unknown(_) => Err(ExtractionError::UnsupportedFormat(format!(
                "{} (expected PDF or DOCX)",
                format
            ))),
        }
    }

    pub fn extract(&self, document: &Document) -> ExtractResult<ExtractedText> {
        debug!("Extracting text from {} ({})", document.name, document.format);
        self.extractor_for(&document.format)?.extract(document)
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(DOCUMENT_PART, FileOptions::default()).unwrap();
        write!(
            writer,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
        .unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_join_units_skips_empty() {
        let units = vec!["Page one".to_string(), "   ".to_string(), String::new(), "Page three".to_string()];
        assert_eq!(join_units(units).unwrap(), "Page one Page three");
    }

    #[test]
    fn test_join_units_all_empty() {
        let units = vec![String::new(), "\n".to_string()];
        assert_eq!(join_units(units), Err(ExtractionError::EmptyContent));
        assert_eq!(join_units(Vec::new()), Err(ExtractionError::EmptyContent));
    }

    #[test]
    fn test_docx_paragraphs_in_order() {
        let bytes = docx_with_body(
            r#"<w:p w:rsidR="00A1"><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Jane</w:t></w:r><w:r><w:t xml:space="preserve"> Doe</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>Rust</w:t><w:tab/><w:t>Tokio</w:t></w:r></w:p>"#,
        );
        let document = Document::new("jane.docx", DocumentFormat::Docx, bytes);

        let extracted = DocumentExtractor::new().extract(&document).unwrap();
        assert_eq!(extracted.document_name, "jane.docx");
        assert_eq!(extracted.text, "Jane Doe Rust\tTokio");
    }

    #[test]
    fn test_docx_entities_decoded() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>R&amp;D &lt;systems&gt; &#233;quipe &#x2013; &quot;lead&quot;</w:t></w:r></w:p>"#,
        );
        let document = Document::new("cv.docx", DocumentFormat::Docx, bytes);

        let extracted = DocumentExtractor::new().extract(&document).unwrap();
        assert_eq!(extracted.text, "R&D <systems> équipe – \"lead\"");
    }

    #[test]
    fn test_docx_escaped_references_decoded_once() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>AT&#38;amp;T &amp;lt;tag&amp;gt; &#38;#65; &bogus; &#xD800;</w:t></w:r></w:p>"#,
        );
        let document = Document::new("cv.docx", DocumentFormat::Docx, bytes);

        let extracted = DocumentExtractor::new().extract(&document).unwrap();
        assert_eq!(extracted.text, "AT&amp;T &lt;tag&gt; &#65; &bogus; &#xD800;");
    }

    #[test]
    fn test_docx_without_text_is_empty_content() {
        let bytes = docx_with_body(r#"<w:p/><w:p><w:pPr/></w:p>"#);
        let document = Document::new("blank.docx", DocumentFormat::Docx, bytes);

        let result = DocumentExtractor::new().extract(&document);
        assert_eq!(result, Err(ExtractionError::EmptyContent));
    }

    #[test]
    fn test_docx_not_a_zip_is_corrupt() {
        let document = Document::new("broken.docx", DocumentFormat::Docx, b"not a zip".to_vec());

        let result = DocumentExtractor::new().extract(&document);
        assert!(matches!(result, Err(ExtractionError::CorruptDocument(_))));
    }

    #[test]
    fn test_docx_missing_document_part_is_corrupt() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/styles.xml", FileOptions::default()).unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let document = Document::new("styles-only.docx", DocumentFormat::Docx, bytes);

        let result = DocumentExtractor::new().extract(&document);
        assert!(matches!(result, Err(ExtractionError::CorruptDocument(msg)) if msg.contains(DOCUMENT_PART)));
    }

    #[test]
    fn test_garbage_pdf_is_corrupt() {
        let document = Document::new("scan.pdf", DocumentFormat::Pdf, b"%PDF-1.4 garbage".to_vec());

        let result = DocumentExtractor::new().extract(&document);
        assert!(matches!(result, Err(ExtractionError::CorruptDocument(_))));
    }

    #[test]
    fn test_parser_panic_is_corrupt() {
        let result: ExtractResult<Vec<String>> = catch_parser_panic(|| panic!("unexpected xref entry"));
        assert_eq!(
            result,
            Err(ExtractionError::CorruptDocument("parser aborted on malformed input".to_string()))
        );
        assert_eq!(catch_parser_panic(|| 7), Ok(7));
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let document = Document::new(
            "resume.txt",
            DocumentFormat::Unknown("txt".to_string()),
            b"plain text".to_vec(),
        );

        let result = DocumentExtractor::new().extract(&document);
        assert!(matches!(result, Err(ExtractionError::UnsupportedFormat(msg)) if msg.contains(".txt")));
    }
}
