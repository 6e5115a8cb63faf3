//! Normalization of request paths and referers.
//!
//! All functions trim whitespace first, then turn backslashes into
//! slashes, then strip punctuation from the edges.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Characters treated as whitespace when trimming.
pub const SPACES: &[char] = &[' ', '\x07', '\x08', '\x0c', '\n', '\r', '\t', '\x0b'];

const PATH_EDGES: &[char] = &['#', '/', '?', '\\'];
const REFERER_EDGES: &[char] = &['#', '/', '\\', ' '];

/// Percent-decode a request path.  Invalid UTF-8 sequences are replaced
/// with U+FFFD.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

fn slashes(s: &str) -> String {
    s.trim_matches(SPACES).replace('\\', "/")
}

/// Normalized request path: `"/foo/bar/"` becomes `"foo/bar"`.
pub fn href(path: &str) -> String {
    slashes(path).trim_matches(PATH_EDGES).to_owned()
}

/// Like [`href`] but over the raw request-target, query string included.
pub fn uri(target: &str) -> String {
    slashes(target).trim_matches(PATH_EDGES).to_owned()
}

/// Normalized `Referer` header value.
pub fn referer(raw: &str) -> String {
    slashes(raw).trim_matches(REFERER_EDGES).to_owned()
}

/// [`referer`] with trailing separators and digits removed, so that
/// `.../item/42` and `.../item/7` compare equal.
pub fn base_referer(raw: &str) -> String {
    referer(raw)
        .trim_end_matches(|c: char| {
            SPACES.contains(&c) || matches!(c, '/' | '\\' | '#' | '-') || c.is_ascii_digit()
        })
        .to_owned()
}
