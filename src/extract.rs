// src/extract.rs
// =============================================================================
// Pulls email addresses out of raw page text.
//
// The pattern is permissive on purpose, so it also matches things like
// "logo@2x.png". Those are dropped by filter_common_extensions(), and
// dedupe() removes repeats while keeping first-seen order.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern is valid")
});

// Suffixes that mean "this is a file name, not an address".
const NON_ADDRESS_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".css", ".js", ".ico", ".svg", ".webp", ".pdf", ".zip",
    ".rar", ".tar", ".gz", ".7z", ".mp3", ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv",
    ".m4v", ".webm", ".ogg", ".flac", ".wav", ".aac", ".wma", ".m4a", ".opus", ".mid",
    ".midi", ".mpg", ".mpeg",
];

/// Every non-overlapping email-shaped match in `text`, in order of
/// appearance. Duplicates are kept.
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Drops matches whose lowercased suffix is a known file extension.
pub fn filter_common_extensions(emails: Vec<String>) -> Vec<String> {
    emails
        .into_iter()
        .filter(|email| {
            let lower = email.to_ascii_lowercase();
            !NON_ADDRESS_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        })
        .collect()
}

/// Order-preserving removal of repeated values.
pub fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

// Convenience for the crawl step: extract -> filter -> dedupe.
pub fn emails_in(text: &str) -> Vec<String> {
    dedupe(filter_common_extensions(extract_emails(text)))
}
