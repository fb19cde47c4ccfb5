use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the document loader.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The input bytes do not decode as a valid PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    /// The source PDF could not be read from the filesystem.
    #[error("failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
    /// The documents directory does not exist.
    #[error("documents directory not found: {0}")]
    MissingDirectory(PathBuf),
    /// The documents directory holds no PDF with extractable text.
    #[error("no readable PDF documents in {0}")]
    NoDocuments(PathBuf),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, PdfError>;
