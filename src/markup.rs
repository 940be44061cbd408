//! SVG markup post-processing.
//!
//! The engine's SVG is touched in two separate passes:
//! - structural fixes applied once per render ([`repair_font_families`],
//!   [`set_root_attr`] for the render id)
//! - the view transform ([`inline_markup`]), applied every time the zoom
//!   changes without asking the engine to lay anything out again.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::zoom::Zoom;

static ROOT_SVG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<svg\b[^>]*>").expect("root svg pattern is valid"));

/// Declarations that make the SVG sit inline in a message.
pub const INLINE_STYLE: &str = "max-width: 100%; height: auto; display: block; margin: 0 auto;";

/// Fix unescaped double quotes inside `font-family` attributes.
///
/// The engine emits values like `font-family="Inter, "Segoe UI", sans-serif"`
/// which is not valid XML. Inner double quotes become single quotes.
pub fn repair_font_families(svg: &str) -> String {
    const MARKER: &str = "font-family=\"";
    let mut result = String::with_capacity(svg.len());
    let mut rest = svg;

    while let Some(pos) = rest.find(MARKER) {
        result.push_str(&rest[..pos + MARKER.len()]);
        rest = &rest[pos + MARKER.len()..];

        // The closing quote is one followed by `>`, ` `, `/` or end of input.
        let mut end_offset = rest.len();
        let mut value_end = rest.len();
        for (i, ch) in rest.char_indices() {
            if ch != '"' {
                continue;
            }
            let after = rest[i + ch.len_utf8()..].chars().next();
            if after.is_none_or(|c| matches!(c, '>' | ' ' | '/')) {
                value_end = i;
                end_offset = i + 1;
                break;
            }
        }
        result.push_str(&rest[..value_end].replace('"', "'"));
        if end_offset > value_end {
            result.push('"');
        }
        rest = &rest[end_offset..];
    }
    result.push_str(rest);
    result
}

/// Set (or replace) an attribute on the root `<svg>` element.
///
/// Markup without an `<svg>` root is returned unchanged.
pub fn set_root_attr(svg: &str, name: &str, value: &str) -> String {
    let Some(tag) = ROOT_SVG_TAG.find(svg) else {
        return svg.to_string();
    };
    let new_tag = tag_with_attr(tag.as_str(), name, value);
    let mut out = String::with_capacity(svg.len() + value.len() + name.len() + 4);
    out.push_str(&svg[..tag.start()]);
    out.push_str(&new_tag);
    out.push_str(&svg[tag.end()..]);
    out
}

/// Grow the root `viewBox` by `pad` units on every side.
///
/// Numeric `width`/`height` attributes grow by the same amount so the drawing
/// keeps its scale. Markup without a four-number `viewBox` is unchanged.
pub fn pad_view_box(svg: &str, pad: f32) -> String {
    if !pad.is_finite() || pad <= 0.0 {
        return svg.to_string();
    }
    let Some(view_box) = root_attr(svg, "viewBox") else {
        return svg.to_string();
    };
    let numbers: Option<Vec<f32>> = view_box
        .split([' ', ','])
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect();
    let Some(&[x, y, width, height]) = numbers.as_deref() else {
        return svg.to_string();
    };
    let padded = format!(
        "{} {} {} {}",
        x - pad,
        y - pad,
        width + 2.0 * pad,
        height + 2.0 * pad
    );
    let mut out = set_root_attr(svg, "viewBox", &padded);
    for name in ["width", "height"] {
        if let Some(size) = root_attr(&out, name).and_then(|v| v.parse::<f32>().ok()) {
            out = set_root_attr(&out, name, &(size + 2.0 * pad).to_string());
        }
    }
    out
}

/// Read an attribute from the root `<svg>` element.
pub fn root_attr<'a>(svg: &'a str, name: &str) -> Option<&'a str> {
    let tag = ROOT_SVG_TAG.find(svg)?;
    let (start, end) = find_attr(tag.as_str(), name)?;
    Some(&svg[tag.start() + start..tag.start() + end])
}

/// CSS declarations for the root element at a given zoom.
///
/// The transform is only present away from 1.0 and is anchored at the
/// visual centre.
pub fn view_style(zoom: Zoom) -> Cow<'static, str> {
    if zoom.is_default() {
        Cow::Borrowed(INLINE_STYLE)
    } else {
        Cow::Owned(format!(
            "{INLINE_STYLE} transform: scale({}); transform-origin: 50% 50%;",
            zoom.css_value()
        ))
    }
}

/// Apply inline display styling and the zoom transform to engine markup.
///
/// Existing root styles are kept; the inline declarations are appended so
/// they take precedence.
pub fn inline_markup(svg: &str, zoom: Zoom) -> String {
    let view = view_style(zoom);
    let style = match root_attr(svg, "style").map(str::trim) {
        Some(existing) if !existing.is_empty() => {
            let existing = existing.trim_end_matches(';');
            format!("{existing}; {view}")
        }
        _ => view.into_owned(),
    };
    set_root_attr(svg, "style", &style)
}

fn tag_with_attr(tag: &str, name: &str, value: &str) -> String {
    let escaped = htmlize::escape_attribute(value);
    if let Some((start, end)) = find_attr(tag, name) {
        return format!("{}{}{}", &tag[..start], escaped, &tag[end..]);
    }
    // `<svg` is four bytes; insert right after it.
    format!("<svg {name}=\"{escaped}\"{}", &tag[4..])
}

/// Byte range of an attribute's value inside a single tag.
fn find_attr(tag: &str, name: &str) -> Option<(usize, usize)> {
    let needle = format!("{name}=\"");
    let mut search_from = 0;
    while let Some(rel) = tag[search_from..].find(&needle) {
        let pos = search_from + rel;
        let preceded_by_space = tag[..pos]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        let value_start = pos + needle.len();
        if preceded_by_space {
            let value_end = value_start + tag[value_start..].find('"')?;
            return Some((value_start, value_end));
        }
        search_from = value_start;
    }
    None
}
