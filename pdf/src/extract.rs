use std::path::Path;

use lopdf::Document;

use crate::error::{PdfError, Result};

/// Extracts the full text of a PDF file, pages in order joined with `\n`.
pub fn extract_from_path(path: &Path) -> Result<String> {
    let doc = Document::load(path).map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(extract_document(&doc))
}

/// Extracts the full text of a PDF held in memory.
pub fn extract_from_bytes(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(extract_document(&doc))
}

fn extract_document(doc: &Document) -> String {
    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    let pages: Vec<String> = page_numbers
        .iter()
        .map(|page_number| {
            let raw = doc
                .extract_text(&[*page_number])
                .unwrap_or_else(|_| String::new());
            normalize_text(&raw)
        })
        .filter(|text| !text.is_empty())
        .collect();

    pages.join("\n")
}

fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
