//! Text helpers shared by the parser front end and the converters.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`
///    or `<meta charset="...">`)
/// 3. Falls back to Windows-1252 (common in pasted legacy markup)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding name from an XML declaration or a `<meta charset>` tag.
///
/// Only the first 1024 bytes are inspected.
pub fn extract_encoding_hint(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    if let Some(start) = prefix.windows(5).position(|w| w == b"<?xml")
        && let Some(value) = quoted_value_after(&prefix[start..], b"encoding=")
    {
        return Some(value);
    }

    let meta = prefix
        .windows(5)
        .position(|w| w.eq_ignore_ascii_case(b"<meta"))?;
    quoted_value_after(&prefix[meta..], b"charset=")
}

/// Find `key` (case-insensitive) and return the quoted value following it.
fn quoted_value_after<'a>(haystack: &'a [u8], key: &[u8]) -> Option<&'a str> {
    let pos = haystack
        .windows(key.len())
        .position(|w| w.eq_ignore_ascii_case(key))?;
    let after = &haystack[pos + key.len()..];

    let quote = *after.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let end = after[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after[1..end]).ok()
}

/// Collapse runs of ASCII whitespace into a single space.
///
/// Returns the input unchanged (borrowed) when there is nothing to collapse.
pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        || text.bytes().any(|b| b.is_ascii_whitespace() && b != b' ');

    if !needs_work {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_borrows() {
        let decoded = decode_text("héllo".as_bytes(), None);
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "héllo");
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        // 0xE9 is "é" in Windows-1252 and invalid as standalone UTF-8
        let bytes = b"caf\xE9";
        assert_eq!(decode_text(bytes, None), "café");
    }

    #[test]
    fn test_decode_uses_hint() {
        // 0xE9 in ISO-8859-2 is also "é"
        let bytes = b"caf\xE9";
        assert_eq!(decode_text(bytes, Some("iso-8859-2")), "café");
    }

    #[test]
    fn test_extract_encoding_from_xml_declaration() {
        let bytes = br#"<?xml version="1.0" encoding="windows-1252"?><p>x</p>"#;
        assert_eq!(extract_encoding_hint(bytes), Some("windows-1252"));
    }

    #[test]
    fn test_extract_encoding_from_meta() {
        let bytes = br#"<html><head><META charset='iso-8859-1'></head>"#;
        assert_eq!(extract_encoding_hint(bytes), Some("iso-8859-1"));
        assert_eq!(extract_encoding_hint(b"<p>plain</p>"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert!(matches!(collapse_whitespace("a b"), Cow::Borrowed(_)));
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("\n"), " ");
    }
}
