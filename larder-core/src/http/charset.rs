//! Charset handling for fetched pages.
//!
//! Recipe sites still serve legacy encodings. The declared charset is taken from
//! the Content-Type header, falling back to a `<meta>` declaration near the top
//! of the document, and the body is transcoded to UTF-8 with encoding_rs.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

/// How far into the document a `<meta>` charset declaration is looked for.
const META_SCAN_BYTES: usize = 1024;

static HEADER_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#).expect("valid regex")
});

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#).expect("valid regex")
});

/// Decode page bytes to a UTF-8 string.
///
/// Header charset wins over a meta declaration. Undeclared bytes are read as
/// UTF-8, with invalid sequences replaced by U+FFFD.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(|ct| label_encoding(&HEADER_CHARSET, ct.as_bytes()))
        .or_else(|| label_encoding(&META_CHARSET, &bytes[..bytes.len().min(META_SCAN_BYTES)]));

    match declared {
        Some(encoding) if encoding != UTF_8 => encoding.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn label_encoding(pattern: &Regex, haystack: &[u8]) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}
