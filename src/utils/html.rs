//! HTML markup helpers.
//!
//! Provides the low-level pieces the fragment DOM is built from:
//! - `is_void_element()` - Elements without end tag (br, img, etc.)
//! - `is_raw_text_element()` - Elements whose content is not markup (script, style)
//! - `is_preformatted_element()` - Elements printed byte for byte (raw text, pre)
//! - `escape_attr()` - Attribute value escaping for double-quoted output
//! - `split_open_tag()` - Locate the attribute section of a raw element
//! - `parse_attributes()` - Ordered HTML attribute string parsing
//! - `split_prolog()` - Leading `<!DOCTYPE ...>` declaration
//! - `split_raw_text()` - Pull raw text element content out of markup

use std::borrow::Cow;

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element (no end tag, no children).
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content is text, never markup).
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "script" | "style" | "textarea" | "title"
    )
}

/// Check if tag content must be printed byte for byte.
#[inline]
pub fn is_preformatted_element(tag: &str) -> bool {
    is_raw_text_element(tag) || tag.eq_ignore_ascii_case("pre")
}

// =============================================================================
// Escaping
// =============================================================================

/// Escape an attribute value for output inside double quotes.
///
/// Values are kept as written in the source, so existing entities stay
/// untouched; only a bare `"` (possible when the source used single quotes)
/// needs replacing.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if s.contains('"') {
        Cow::Owned(s.replace('"', "&quot;"))
    } else {
        Cow::Borrowed(s)
    }
}

// =============================================================================
// Raw Tag Scanning
// =============================================================================

/// Opening tag of a raw element, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTag<'a> {
    /// Everything between the tag name and the closing `>` (or `/>`).
    pub attrs: &'a str,
    /// Whether the tag was written as `<name ... />`.
    pub self_closing: bool,
}

/// Split the opening tag off raw element markup such as `<div id="a">..</div>`.
///
/// Quoted attribute values may contain `>`; they are skipped.
pub fn split_open_tag(raw: &str) -> Option<OpenTag<'_>> {
    let rest = raw.strip_prefix('<')?;
    let name_len = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    let body = &rest[name_len..];

    let mut quote: Option<char> = None;
    let mut end = None;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }

    // Unterminated tag: treat the remainder as attributes
    let inner = &body[..end.unwrap_or(body.len())];
    let trimmed = inner.trim_end();
    match trimmed.strip_suffix('/') {
        Some(attrs) => Some(OpenTag {
            attrs,
            self_closing: true,
        }),
        None => Some(OpenTag {
            attrs: inner,
            self_closing: false,
        }),
    }
}

// =============================================================================
// Attribute Parsing
// =============================================================================

/// Parse HTML-style attributes from a string, preserving source order.
///
/// Names are lowercased, values kept as written.
///
/// Input: `ID="a" class='x y' hidden data-n=3`
/// Output: `[("id", Some("a")), ("class", Some("x y")), ("hidden", None), ("data-n", Some("3"))]`
pub fn parse_attributes(s: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }

        // Read attribute name
        let mut name = String::new();
        name.push(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next == '/' || next.is_whitespace() {
                break;
            }
            name.push(next);
            chars.next();
        }

        // Skip whitespace
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            // Boolean attribute (no value)
            attrs.push((name.to_ascii_lowercase(), None));
            continue;
        }
        chars.next(); // consume '='

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                // Unquoted value (read until whitespace)
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
        }
        attrs.push((name.to_ascii_lowercase(), Some(value)));
    }

    attrs
}

// =============================================================================
// Source Pre-scan
// =============================================================================

/// Split a leading `<!DOCTYPE ...>` (with the whitespace before it) off `source`.
///
/// Returns `("", source)` when there is none.
pub fn split_prolog(source: &str) -> (&str, &str) {
    let start = source.len() - source.trim_start().len();
    let rest = &source[start..];
    let is_doctype = rest
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"));
    match rest.find('>') {
        Some(end) if is_doctype => source.split_at(start + end + 1),
        _ => ("", source),
    }
}

/// Remove the content of raw text elements from `source`.
///
/// Returns the remaining markup, with every `<script>`, `<style>`, `<textarea>`
/// and `<title>` left empty, and the removed contents in document order.
/// Self-closing raw text tags contribute no entry. Comments and the inside of
/// tags are skipped, so `<script>` in an attribute value or comment is not
/// mistaken for an element.
pub fn split_raw_text(source: &str) -> (String, Vec<String>) {
    let mut markup = String::with_capacity(source.len());
    let mut contents = Vec::new();
    let mut rest = source;

    while let Some(lt) = rest.find('<') {
        markup.push_str(&rest[..lt]);
        let tail = &rest[lt..];

        if let Some(body) = tail.strip_prefix("<!--") {
            let end = body.find("-->").map_or(tail.len(), |i| 4 + i + 3);
            markup.push_str(&tail[..end]);
            rest = &tail[end..];
            continue;
        }

        let Some(open_len) = open_tag_len(tail) else {
            markup.push('<');
            rest = &tail[1..];
            continue;
        };
        let open = &tail[..open_len];
        markup.push_str(open);
        rest = &tail[open_len..];

        let name = tag_name(open);
        let self_closing = split_open_tag(open).is_some_and(|tag| tag.self_closing);
        if is_raw_text_element(name) && !self_closing {
            let end = find_close_tag(rest, name).unwrap_or(rest.len());
            contents.push(rest[..end].to_string());
            rest = &rest[end..];
        }
    }

    markup.push_str(rest);
    (markup, contents)
}

/// Length of the opening tag at the start of `s`, `>` included.
fn open_tag_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix('<')?;
    if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(1 + i + 1),
            _ => {}
        }
    }
    None
}

fn tag_name(open: &str) -> &str {
    let rest = &open[1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Byte offset of `</name` (any case) that closes a raw text element.
fn find_close_tag(s: &str, name: &str) -> Option<usize> {
    let lower = s.to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());
    let mut from = 0;
    while let Some(i) = lower[from..].find(&needle) {
        let at = from + i;
        let next = lower.as_bytes().get(at + needle.len()).copied();
        if next.is_none_or(|b| b == b'>' || b == b'/' || b.is_ascii_whitespace()) {
            return Some(at);
        }
        from = at + needle.len();
    }
    None
}
