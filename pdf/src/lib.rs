//! PDF text extraction for the Aadhaar chat agent.
//!
//! Scans a directory of PDF files and turns each into normalized plain text
//! ready for chunking. Extraction failures degrade per file, never per run.

mod error;
mod extract;
mod loader;

pub use error::{PdfError, Result};
pub use extract::{extract_from_bytes, extract_from_path};
pub use loader::{ExtractedDocument, PdfLoader};
