use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use echowork_seed::{ParsedLine, Result, SeedError};
use tracing::{debug, error};

use crate::line_parser::parse_company_line;

/// `*.pdf` files directly under `dir`, sorted by name.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".pdf"))
        })
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read PDF");

    // pdf-extract panics on some malformed fonts; treat that like any other
    // extraction failure for this file
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    }));
    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(SeedError::Pdf {
                path: path.to_path_buf(),
                message: format!("{e:?}"),
            })
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic inside PDF library".to_string());
            return Err(SeedError::Pdf {
                path: path.to_path_buf(),
                message,
            });
        }
    };
    debug!(path = %path.display(), chars = text.len(), "extracted text");
    Ok(text)
}

/// Run every text line through the listing parser.
pub fn parse_text(text: &str) -> Vec<ParsedLine> {
    text.split(['\n', '\x0c'])
        .filter_map(parse_company_line)
        .collect()
}

/// Companies found in one PDF. Failures are logged and yield an empty list so
/// the remaining files still get processed.
pub fn extract_companies_from_pdf(path: &Path) -> Vec<ParsedLine> {
    match extract_text(path) {
        Ok(text) => parse_text(&text),
        Err(e) => {
            error!(path = %path.display(), error = ?e, "failed to process PDF, skipping");
            Vec::new()
        }
    }
}
