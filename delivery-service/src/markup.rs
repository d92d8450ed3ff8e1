//! Endpoint markup helpers.
//!
//! The endpoint parses messages as HTML, so the three markup-significant
//! characters must be escaped in all user-derived text before any structural
//! wrapping is applied. The wrappers here expect already-escaped input.

/// The endpoint's caption limit for media uploads, in characters.
pub const CAPTION_LIMIT: usize = 1024;

/// Escape `&`, `<` and `>` in user-derived text.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap already-escaped text in a preformatted block.
pub fn pre(escaped: &str) -> String {
    format!("<pre>{escaped}</pre>")
}

/// Wrap already-escaped text in bold.
pub fn bold(escaped: &str) -> String {
    format!("<b>{escaped}</b>")
}

/// Truncate a caption to the endpoint's limit, on a char boundary.
pub fn truncate_caption(caption: &str) -> String {
    caption.chars().take(CAPTION_LIMIT).collect()
}
