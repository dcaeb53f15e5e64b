use std::{fs, path::Path};

mod error;
mod index;
mod parser;
mod unescape;

pub use error::{Diagnostic, DiagnosticKind, ParseError, ParseErrorKind};
pub use index::{AccountRecord, PreferredAccount, ProfileIndex, MAX_SECONDS};
pub use parser::{LineClassifier, ProfileLine};
pub use unescape::unescape;

/// The account type most exports are filtered to.
pub const STANDARD_MODE: &str = "STANDARD";

pub fn parse_file(path: impl AsRef<Path>) -> Result<ProfileIndex, ParseError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        ParseError::new("E2001", format!("failed to read profile: {e}"))
            .with_file(path.display().to_string())
    })?;
    parse_bytes(&bytes)
}

/// Decodes as UTF-8, replacing invalid sequences, then parses.
pub fn parse_bytes(bytes: &[u8]) -> Result<ProfileIndex, ParseError> {
    parse_str(&String::from_utf8_lossy(bytes))
}

pub fn parse_str(src: &str) -> Result<ProfileIndex, ParseError> {
    let classifier = LineClassifier::new()?;
    let mut index = ProfileIndex::new();

    for (i, raw_line) in src.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(line) = classifier.classify(trimmed) {
            index.apply(line_no, line);
        }
    }

    index.finish();
    Ok(index)
}

/// Whether an uploaded file name looks like a profile export, e.g.
/// `$rsprofile--1.properties`.
pub fn is_profile_upload(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".properties") && lower.contains("rsprofile")
}
