//! Minimal HTML-to-text flattening.
//!
//! Rich outputs and remote problem statements arrive as HTML fragments; what
//! gets relayed is readable text. Tables flatten to tab-separated rows, other
//! markup is stripped, and the handful of entities that survive stripping are
//! decoded.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref TABLE: Regex = Regex::new(r"(?is)<table[^>]*>.*?</table>").unwrap();
    static ref ROW: Regex = Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap();
    static ref CELL: Regex = Regex::new(r"(?is)<t[hd][^>]*>(.*?)</t[hd]>").unwrap();
    static ref BLOCK_BREAK: Regex = Regex::new(r"(?i)<(?:/p|br\s*/?|/div|/li)>").unwrap();
    static ref ANSI: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
}

/// Strip ANSI color escapes from terminal-styled text.
pub fn strip_ansi(text: &str) -> String {
    ANSI.replace_all(text, "").into_owned()
}

/// Flatten an HTML fragment to plain text.
///
/// Tables become tab-separated rows; block-level closers become line breaks;
/// all remaining tags are dropped and entities decoded.
pub fn fragment_to_text(html: &str) -> String {
    let with_tables = TABLE.replace_all(html, |caps: &regex::Captures<'_>| table_to_text(&caps[0]));
    let with_breaks = BLOCK_BREAK.replace_all(&with_tables, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    decode_entities(stripped.trim())
}

/// Flatten one HTML table to tab-separated rows.
pub fn table_to_text(table_html: &str) -> String {
    let mut rows = Vec::new();
    for row in ROW.captures_iter(table_html) {
        let cells: Vec<String> = CELL
            .captures_iter(&row[1])
            .map(|cell| decode_entities(TAG.replace_all(&cell[1], "").trim()))
            .collect();
        rows.push(cells.join("\t"));
    }
    rows.join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
