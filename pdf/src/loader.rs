use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PdfError, Result};
use crate::extract::extract_from_path;

/// Text extracted from one PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// File name of the source PDF, extension included.
    pub file_name: String,
    /// Normalized text, pages joined with `\n`.
    pub text: String,
}

/// Loads every PDF in a directory, skipping files that fail to parse.
#[derive(Debug, Clone)]
pub struct PdfLoader {
    dir: PathBuf,
}

impl PdfLoader {
    /// Creates a loader rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory this loader scans.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Extracts text from every `*.pdf` directly under the directory, in
    /// sorted filename order.
    ///
    /// Files that fail to parse are skipped with a warning. Files with no
    /// extractable text are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::MissingDirectory`] if the directory does not
    /// exist and [`PdfError::NoDocuments`] if nothing readable was found.
    pub fn load_all(&self) -> Result<Vec<ExtractedDocument>> {
        if !self.dir.is_dir() {
            return Err(PdfError::MissingDirectory(self.dir.clone()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in &paths {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            match extract_from_path(path) {
                Ok(text) if text.is_empty() => {
                    warn!(file = %file_name, "no extractable text, skipping");
                }
                Ok(text) => {
                    debug!(file = %file_name, chars = text.len(), "extracted");
                    documents.push(ExtractedDocument { file_name, text });
                }
                Err(error) => {
                    warn!(file = %file_name, %error, "failed to extract, skipping");
                }
            }
        }

        if documents.is_empty() {
            return Err(PdfError::NoDocuments(self.dir.clone()));
        }
        Ok(documents)
    }
}
