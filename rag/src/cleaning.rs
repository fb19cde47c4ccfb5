//! Text cleaning executed before chunking.

use crate::types::Document;

/// Trait for document cleaning strategies.
pub trait Cleaner: Send + Sync {
    /// Cleans the input document and returns a normalized version.
    fn clean(&self, doc: &Document) -> Document;

    /// Returns the cleaner name.
    fn name(&self) -> &'static str;
}

/// Default cleaner used before chunking.
///
/// Collapses every whitespace run (spaces, tabs, newlines) into a single
/// space and trims the result, so the word stream seen by the chunker is
/// unambiguous.
#[derive(Debug, Clone, Default)]
pub struct BasicCleaner;

impl Cleaner for BasicCleaner {
    fn clean(&self, doc: &Document) -> Document {
        let collapsed = doc.text.split_whitespace().collect::<Vec<_>>().join(" ");
        Document::with_metadata(doc.id.clone(), collapsed, doc.metadata.clone())
    }

    fn name(&self) -> &'static str {
        "basic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        let doc = Document::new("d1", "  Aadhaar\tis a\r\n12-digit\n\n  number.  ");
        let cleaned = BasicCleaner.clean(&doc);
        assert_eq!(cleaned.text, "Aadhaar is a 12-digit number.");
    }

    #[test]
    fn empty_stays_empty() {
        let doc = Document::new("d1", "   \n\t ");
        assert_eq!(BasicCleaner.clean(&doc).text, "");
    }
}
