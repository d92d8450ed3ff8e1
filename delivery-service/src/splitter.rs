//! Message splitter - cuts oversized text into ordered, line-aligned chunks.
//!
//! The endpoint rejects text messages past a hard character limit, so longer
//! text is split before any network call. Splits prefer the nearest line
//! break at or above half the limit; otherwise they fall at exactly the
//! limit, which bounds the chunk count by ceil(len/limit) even for text with
//! no breaks at all. Chunks concatenate back to the original text exactly.

/// The endpoint's hard limit for one text message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Split `text` into ordered chunks of at most `limit` characters.
///
/// Text at or under the limit comes back as a single chunk equal to the
/// input. Limits are measured in characters, so a split can never land
/// inside a code point.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    loop {
        if remaining.chars().count() <= limit {
            chunks.push(remaining.to_string());
            break;
        }

        let split_chars = match last_newline_at_or_before(remaining, limit) {
            // Line-aligned split, but only when it keeps the chunk from
            // degenerating below half the limit.
            Some(index) if index * 2 >= limit => index,
            _ => limit,
        };

        let split_bytes = byte_offset_of_char(remaining, split_chars);
        chunks.push(remaining[..split_bytes].to_string());
        remaining = &remaining[split_bytes..];
    }

    chunks
}

/// Character index of the last `\n` at char position <= `limit`, if any.
fn last_newline_at_or_before(text: &str, limit: usize) -> Option<usize> {
    text.chars()
        .take(limit + 1)
        .enumerate()
        .filter(|(_, c)| *c == '\n')
        .map(|(index, _)| index)
        .last()
}

/// Byte offset of the char at index `n` (or the end of the string).
fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_message("hello", 4096);
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn test_exact_limit_single_chunk() {
        let text = "x".repeat(10);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_unbroken_text_splits_at_exact_limit() {
        let text = "x".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 10);
        assert_eq!(chunks[2].len(), 5);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_line_aligned_split_above_half_limit() {
        // Newline at index 7 with limit 10: 7 >= 5, so split there. The
        // newline itself leads the next chunk.
        let text = format!("{}\n{}", "a".repeat(7), "b".repeat(8));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks[0], "a".repeat(7));
        assert_eq!(chunks[1], format!("\n{}", "b".repeat(8)));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_early_newline_ignored() {
        // Newline at index 2 with limit 10: 2 < 5, split at exactly 10
        // rather than producing a tiny chunk.
        let text = format!("ab\n{}", "c".repeat(20));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks[0].chars().count(), 10);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_leading_line_then_long_run() {
        // The endpoint-limit scenario: a short first line followed by an
        // unbroken 5000-char run still yields exactly two chunks.
        let text = format!("line1\n{}", "x".repeat(5000));
        let chunks = split_message(&text, 4096);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].chars().count() <= 4096);
        assert!(chunks[1].chars().count() <= 4096);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_multiline_text_prefers_line_breaks() {
        let lines: Vec<String> = (0..40).map(|i| format!("line number {i}")).collect();
        let text = lines.join("\n");
        let chunks = split_message(&text, 100);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
        assert_eq!(chunks.concat(), text);
        // Every non-final chunk ended at a line boundary (the break lands at
        // the start of the following chunk).
        for chunk in &chunks[1..] {
            assert!(chunk.starts_with('\n'));
        }
    }

    #[test]
    fn test_multibyte_text_never_splits_a_char() {
        let text = "héllo wörld ".repeat(40);
        let chunks = split_message(&text, 17);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 17);
        }
        assert_eq!(chunks.concat(), text);
    }

    proptest! {
        #[test]
        fn prop_chunks_rejoin_to_original(text in "\\PC{0,400}", limit in 1usize..64) {
            let chunks = split_message(&text, limit);
            prop_assert_eq!(chunks.concat(), text);
        }

        #[test]
        fn prop_every_chunk_within_limit(text in "(\\PC|\\n){0,400}", limit in 1usize..64) {
            for chunk in split_message(&text, limit) {
                prop_assert!(chunk.chars().count() <= limit);
            }
        }

        #[test]
        fn prop_chunk_count_bounded(text in "[a-z\\n]{0,400}", limit in 1usize..64) {
            let chunks = split_message(&text, limit);
            let chars = text.chars().count();
            // Line-aligned splits keep every chunk at >= limit/2 chars, so
            // the count is at most twice the unaligned bound.
            let bound = 2 * (chars / limit + 2);
            prop_assert!(chunks.len() <= bound);
        }
    }
}
