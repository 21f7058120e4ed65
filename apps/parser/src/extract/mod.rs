//! Document text extraction: decodes PDF / DOCX / plain-text input into
//! a [`NormalizedDocument`]: original line structure in `raw_text` for
//! the line-oriented stages, fully normalized `cleaned_text` for the
//! token-oriented ones.
//!
//! PDF decoding tries `pdf-extract` first and falls back to page-by-page
//! `lopdf` extraction at a lower declared confidence. Zero extractable
//! text is an empty string, not an error; only a failed decode is.

mod normalize;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::errors::ParseError;

pub use normalize::clean_text;

// Declared extraction confidences per strategy.
const CONFIDENCE_PDF_PRIMARY: f64 = 0.9;
const CONFIDENCE_PDF_FALLBACK: f64 = 0.7;
const CONFIDENCE_DOCX: f64 = 0.95;
const CONFIDENCE_PLAIN_TEXT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Basic layout metadata collected during decoding. Which fields are
/// populated depends on the extraction strategy that ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub page_count: Option<usize>,
    pub paragraph_count: Option<usize>,
    pub table_count: Option<usize>,
    pub line_count: Option<usize>,
    pub has_tables: bool,
}

/// Output of text extraction. Immutable once produced; owned by the
/// caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Decoded text with original line breaks preserved.
    pub raw_text: String,
    /// Fully normalized text: allow-list filtered, whitespace collapsed.
    pub cleaned_text: String,
    pub extraction_method: String,
    pub extraction_confidence: f64,
    pub layout: LayoutInfo,
}

/// Decodes documents of the accepted formats into [`NormalizedDocument`]s.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    max_file_size: u64,
    allowed_formats: Vec<DocumentFormat>,
}

impl TextExtractor {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            allowed_formats: config.allowed_formats.clone(),
        }
    }

    pub fn supported_formats(&self) -> &[DocumentFormat] {
        &self.allowed_formats
    }

    /// Extracts text from a file, inferring the format from its
    /// extension. A missing file is a fatal precondition violation.
    pub fn extract_file(&self, path: &Path) -> Result<NormalizedDocument, ParseError> {
        if !path.exists() {
            return Err(ParseError::NotFound(path.to_path_buf()));
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = DocumentFormat::from_extension(ext)
            .filter(|f| self.allowed_formats.contains(f))
            .ok_or_else(|| ParseError::UnsupportedFormat(format!(".{ext}")))?;

        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size {
            return Err(ParseError::InputTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        debug!(path = %path.display(), %format, size, "extracting document text");
        let bytes = std::fs::read(path)?;
        self.extract_bytes(&bytes, format)
    }

    /// Extracts text from in-memory bytes of a declared format.
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<NormalizedDocument, ParseError> {
        let (raw_text, method, confidence, layout) = match format {
            DocumentFormat::Pdf => extract_pdf(bytes)?,
            DocumentFormat::Docx => extract_docx(bytes)?,
            DocumentFormat::Txt => extract_txt(bytes)?,
        };

        let cleaned_text = clean_text(&raw_text);
        info!(
            method,
            chars = cleaned_text.len(),
            "text extraction complete"
        );

        Ok(NormalizedDocument {
            raw_text,
            cleaned_text,
            extraction_method: method.to_string(),
            extraction_confidence: confidence,
            layout,
        })
    }
}

type Decoded = (String, &'static str, f64, LayoutInfo);

fn extract_pdf(bytes: &[u8]) -> Result<Decoded, ParseError> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => Ok((
            text,
            "pdf-extract",
            CONFIDENCE_PDF_PRIMARY,
            LayoutInfo::default(),
        )),
        Err(primary) => {
            warn!("pdf-extract failed, falling back to lopdf: {primary}");
            extract_pdf_fallback(bytes).map_err(|fallback| {
                ParseError::Malformed(format!(
                    "PDF decode failed: {primary}; fallback: {fallback}"
                ))
            })
        }
    }
}

fn extract_pdf_fallback(bytes: &[u8]) -> anyhow::Result<Decoded> {
    let doc = lopdf::Document::load_mem(bytes)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();

    let mut chunks = Vec::new();
    for page in &pages {
        // A page with no extractable text contributes nothing.
        if let Ok(text) = doc.extract_text(&[*page]) {
            if !text.trim().is_empty() {
                chunks.push(text);
            }
        }
    }

    let layout = LayoutInfo {
        page_count: Some(pages.len()),
        ..Default::default()
    };
    Ok((chunks.join("\n\n"), "lopdf", CONFIDENCE_PDF_FALLBACK, layout))
}

fn extract_docx(bytes: &[u8]) -> Result<Decoded, ParseError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ParseError::Malformed(format!("DOCX decode failed: {e}")))?;

    let mut blocks = Vec::new();
    let mut paragraph_count = 0usize;
    let mut table_count = 0usize;

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let text = paragraph_text(para);
                if !text.trim().is_empty() {
                    paragraph_count += 1;
                    blocks.push(text);
                }
            }
            docx_rs::DocumentChild::Table(table) => {
                table_count += 1;
                for row in table_row_text(table) {
                    if !row.trim().is_empty() {
                        blocks.push(row);
                    }
                }
            }
            _ => {}
        }
    }

    let layout = LayoutInfo {
        paragraph_count: Some(paragraph_count),
        table_count: Some(table_count),
        has_tables: table_count > 0,
        ..Default::default()
    };
    Ok((blocks.join("\n\n"), "docx-rs", CONFIDENCE_DOCX, layout))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(text) = run_child {
                    out.push_str(&text.text);
                }
            }
        }
    }
    out
}

fn table_row_text(table: &docx_rs::Table) -> Vec<String> {
    let mut rows = Vec::new();
    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells = Vec::new();
        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let mut cell_text = String::new();
            for content in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(para) = content {
                    let text = paragraph_text(para);
                    if !text.is_empty() {
                        if !cell_text.is_empty() {
                            cell_text.push(' ');
                        }
                        cell_text.push_str(&text);
                    }
                }
            }
            cells.push(cell_text);
        }
        rows.push(cells.join(" "));
    }
    rows
}

fn extract_txt(bytes: &[u8]) -> Result<Decoded, ParseError> {
    let raw = String::from_utf8(bytes.to_vec())
        .map_err(|e| ParseError::Malformed(format!("text decode failed: {e}")))?;

    let layout = LayoutInfo {
        line_count: Some(raw.lines().count()),
        ..Default::default()
    };
    Ok((raw, "plain-text", CONFIDENCE_PLAIN_TEXT, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn extractor() -> TextExtractor {
        TextExtractor::new(&ParserConfig::default())
    }

    #[test]
    fn test_txt_bytes_full_confidence() {
        let doc = extractor()
            .extract_bytes(b"Jane Doe\nSoftware Engineer", DocumentFormat::Txt)
            .unwrap();
        assert_eq!(doc.extraction_method, "plain-text");
        assert_eq!(doc.extraction_confidence, 1.0);
        assert_eq!(doc.layout.line_count, Some(2));
        assert!(doc.raw_text.contains('\n'));
        assert!(!doc.cleaned_text.contains('\n'));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = extractor()
            .extract_file(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(err, ParseError::NotFound(_)));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let mut file = tempfile::Builder::new().suffix(".odt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();
        let err = extractor().extract_file(file.path()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let config = ParserConfig {
            max_file_size: 4,
            ..Default::default()
        };
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"more than four bytes").unwrap();
        let err = TextExtractor::new(&config)
            .extract_file(file.path())
            .unwrap_err();
        assert!(matches!(err, ParseError::InputTooLarge { limit: 4, .. }));
    }

    #[test]
    fn test_txt_file_roundtrip() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"EXPERIENCE\nAcme Corp").unwrap();
        let doc = extractor().extract_file(file.path()).unwrap();
        assert_eq!(doc.raw_text, "EXPERIENCE\nAcme Corp");
    }

    #[test]
    fn test_malformed_pdf_is_malformed_error() {
        let err = extractor()
            .extract_bytes(b"this is not a pdf", DocumentFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn test_format_from_extension_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_extension("PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(DocumentFormat::from_extension("odt"), None);
    }

    #[test]
    fn test_disallowed_format_rejected() {
        let config = ParserConfig {
            allowed_formats: vec![DocumentFormat::Pdf],
            ..Default::default()
        };
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"text").unwrap();
        let err = TextExtractor::new(&config)
            .extract_file(file.path())
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }
}
