//! Percent-encoding for page and anchor URLs.
//!
//! ASCII alphanumerics and `_ . - ~ /` pass through; every other byte of the
//! UTF-8 encoding becomes `%XX`. Anchors are encoded with the same rule so
//! they line up with the anchor names written into the generated pages.

use std::fmt::Write;
use std::path::{Component, Path};

/// Percent-encode `input`, keeping `/`.
pub fn quote(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-' | b'~' | b'/') {
            out.push(char::from(byte));
        } else {
            // Writing to a String cannot fail.
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Encoded URL of a relative path, with `/` separators on every platform.
pub fn path_url(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    quote(&joined)
}

/// `<page_url>#<encoded keyword>`.
pub fn anchor_url(page_url: &str, keyword: &str) -> String {
    format!("{page_url}#{}", quote(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_characters() {
        assert_eq!(quote("a/b-c_d.e~f"), "a/b-c_d.e~f");
    }

    #[test]
    fn encodes_spaces_and_reserved_characters() {
        assert_eq!(quote("Should Be Equal"), "Should%20Be%20Equal");
        assert_eq!(quote("a#b?c&d"), "a%23b%3Fc%26d");
        assert_eq!(quote("${var}"), "%24%7Bvar%7D");
    }

    #[test]
    fn encodes_utf8_bytes() {
        assert_eq!(quote("Prüfe"), "Pr%C3%BCfe");
    }

    #[test]
    fn path_url_joins_with_slashes() {
        let rel = Path::new("my dir").join("b.html");
        assert_eq!(path_url(&rel), "my%20dir/b.html");
    }

    #[test]
    fn anchor_url_appends_encoded_fragment() {
        assert_eq!(
            anchor_url("a/b.html", "Open Browser"),
            "a/b.html#Open%20Browser"
        );
    }
}
