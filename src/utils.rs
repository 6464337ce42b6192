use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, SeedError};

/// Read a whole input script; a missing file is `InputNotFound`.
pub fn read_input(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SeedError::InputNotFound(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// NFKC-normalize, collapse runs of whitespace to one space and trim.
pub fn normalize_text(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive whole-word pattern for a literal keyword.
pub fn word_regex(needle: &str) -> Option<Regex> {
    if needle.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(needle))).ok()
}

/// Byte offset of the first keyword (in list order) found anywhere in `text`,
/// using its earliest occurrence.
pub fn first_keyword_position(text: &str, keywords: &[Regex]) -> Option<usize> {
    keywords
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.start())
}

pub fn truncate_preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
