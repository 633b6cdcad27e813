//! SVG post-processing.
//!
//! The engine emits SVG documents that carry a `viewBox` but no explicit
//! `width`/`height`. Under auto-sizing layout rules such an image collapses
//! to zero size, so the outer tag gets explicit dimensions copied from its
//! `viewBox`. This is a string-level fix: documents that do not match the
//! expected shape are returned untouched.

use std::{borrow::Cow, sync::OnceLock};

use regex::Regex;

/// Ensures the outer `<svg>` tag has explicit `width` and `height`.
///
/// - A tag that already has a `width` attribute is returned unchanged.
/// - Otherwise the third and fourth `viewBox` fields are inserted as
///   `width` and `height` right before the tag's closing bracket.
/// - Without an outer tag or a well-formed `viewBox` the input is returned
///   unchanged.
///
/// Applying the function twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// # use strata::svg::normalize_dimensions;
/// let svg = r#"<svg viewBox="0 0 120 80"><g/></svg>"#;
/// assert_eq!(
///     normalize_dimensions(svg),
///     r#"<svg viewBox="0 0 120 80" width="120" height="80"><g/></svg>"#
/// );
/// ```
pub fn normalize_dimensions(svg: &str) -> Cow<'_, str> {
    static OPEN_TAG_RE: OnceLock<Regex> = OnceLock::new();
    static WIDTH_RE: OnceLock<Regex> = OnceLock::new();
    static VIEW_BOX_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_END_RE: OnceLock<Regex> = OnceLock::new();

    let open_tag = OPEN_TAG_RE.get_or_init(|| Regex::new(r"<svg\b[^>]*>").expect("valid regex"));
    let width = WIDTH_RE.get_or_init(|| Regex::new(r"\swidth\s*=").expect("valid regex"));
    let view_box = VIEW_BOX_RE.get_or_init(|| {
        Regex::new(r#"\sviewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    });

    let tag_end = TAG_END_RE.get_or_init(|| Regex::new(r"\s*/?\s*>$").expect("valid regex"));

    let Some(tag) = open_tag.find(svg) else {
        return Cow::Borrowed(svg);
    };
    let tag_text = tag.as_str();

    if width.is_match(tag_text) {
        return Cow::Borrowed(svg);
    }

    let Some((w, h)) = view_box
        .captures(tag_text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|m| view_box_size(m.as_str()))
    else {
        return Cow::Borrowed(svg);
    };

    // Insert before any trailing whitespace and `/` so `/ >` stays intact.
    let close = tag.start()
        + tag_end
            .find(tag_text)
            .map_or(tag_text.len() - 1, |end| end.start());

    Cow::Owned(format!(
        "{} width=\"{w}\" height=\"{h}\"{}",
        &svg[..close],
        &svg[close..]
    ))
}

/// Returns the width and height fields of a `viewBox` value, verbatim.
///
/// The value must hold exactly four numbers separated by whitespace and/or
/// commas.
fn view_box_size(value: &str) -> Option<(&str, &str)> {
    let fields: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty())
        .collect();

    if fields.len() != 4 || fields.iter().any(|field| field.parse::<f64>().is_err()) {
        return None;
    }
    Some((fields[2], fields[3]))
}
