// src/urls.rs
// =============================================================================
// Small, stateless helpers for working with URLs found while crawling.
//
// Every function here takes plain strings, parses them (when it needs to),
// answers exactly one question and throws the parse away. Nothing here ever
// returns an error: a URL that cannot be parsed degrades to a "skip it"
// answer (false, None or an empty string) so the crawl can carry on.
//
// Rust concepts:
// - Option<T>: "no answer" instead of a magic -1
// - &str slicing: cheap trimming without allocating
// =============================================================================

use url::Url;

// Extensions that mark a URL as a static file we never want to download.
// Compared case-insensitively against the URL path.
const ASSET_EXTENSIONS: &[&str] = &[
    // images
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".bmp", ".tif", ".tiff",
    // styles and scripts
    ".css", ".js", ".mjs", ".map",
    // fonts
    ".woff", ".woff2", ".ttf", ".otf", ".eot",
    // archives
    ".zip", ".rar", ".tar", ".gz", ".tgz", ".7z", ".bz2",
    // audio / video
    ".mp3", ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".m4v", ".webm", ".ogg",
    ".flac", ".wav", ".aac", ".m4a", ".mpg", ".mpeg",
    // documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".csv",
];

// Returns true if the URL points at a static asset (image, stylesheet,
// script, archive, media file or document).
//
// The path is checked, so "https://x/a.png?v=3" is still an asset. If the
// URL does not parse we fall back to the raw string minus query and anchor.
pub fn is_asset(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => remove_anchor(&remove_query_param(url)).to_ascii_lowercase(),
    };

    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

// True iff both strings parse and their host[:port] is identical as written.
// No normalisation: "https://a.com:443" and "https://a.com" differ.
// A malformed URL on either side is simply "not the same domain".
pub fn is_same_domain(a: &str, b: &str) -> bool {
    match (raw_authority(a), raw_authority(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// The host[:port] part exactly as it appears in `url`, userinfo dropped.
//
// The url crate is only used to reject malformed input: it lowercases hosts
// and forgets default ports, which would hide differences we care about.
fn raw_authority(url: &str) -> Option<&str> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str()?;

    let (_, rest) = url.split_once("://")?;
    let end = rest
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    let host_port = match authority.rsplit_once('@') {
        Some((_, host_port)) => host_port,
        None => authority,
    };

    (!host_port.is_empty()).then_some(host_port)
}

// How many path segments `url` sits below `reference_url`.
//
// Returns:
//   None     -> one of the URLs failed to parse, skip it
//   Some(0)  -> same path as the reference, or not under it at all
//   Some(n)  -> number of '/' separators past the reference path
//
// Examples (reference "https://a.com"):
//   "https://a.com/x"   -> Some(1)
//   "https://a.com/x/y" -> Some(2)
pub fn url_depth(url: &str, reference_url: &str) -> Option<usize> {
    let reference = Url::parse(reference_url).ok()?;
    let parsed = Url::parse(url).ok()?;

    let reference_path = reference.path().trim_end_matches('/');
    let path = parsed.path().trim_end_matches('/');

    let relative = match path.strip_prefix(reference_path) {
        Some(rest) => rest,
        None => return Some(0),
    };

    if relative.is_empty() {
        return Some(0);
    }

    Some(relative.matches('/').count())
}

// Drops everything from the first '?' onward.
pub fn remove_query_param(url: &str) -> String {
    match url.split_once('?') {
        Some((head, _)) => head.to_string(),
        None => url.to_string(),
    }
}

// Drops everything from the first '#' onward.
pub fn remove_anchor(url: &str) -> String {
    match url.split_once('#') {
        Some((head, _)) => head.to_string(),
        None => url.to_string(),
    }
}

// Turns an href into something absolute-looking.
//
// This is deliberately a heuristic, not RFC 3986 resolution:
//   "https://b.com/p"  -> unchanged
//   "/p"               -> base_url + "/p"
//   "./p"              -> current_url + "p"
//   "p"                -> current_url + "p"
// "../" and protocol-relative "//host" are not handled; whatever comes out
// is filtered by the same-domain and depth checks afterwards.
pub fn relative_to_absolute(href: &str, current_url: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    if href.starts_with('/') {
        return format!("{}{}", base_url, href);
    }

    if let Some(rest) = href.strip_prefix("./") {
        return format!("{}{}", current_url, rest);
    }

    format!("{}{}", current_url, href)
}

// scheme + "://" + host[:port] as written, or "" if the URL does not parse.
pub fn get_base_url(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };

    match raw_authority(url) {
        Some(host_port) => format!("{}://{}", parsed.scheme(), host_port),
        None => String::new(),
    }
}
