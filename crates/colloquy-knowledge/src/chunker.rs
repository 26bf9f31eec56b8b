// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splits ingested text into overlapping, bounded chunks.

/// Breakpoints tried in order of preference.
const BREAKS: [&[char]; 3] = [&['\n', '\n'], &['\n'], &[' ']];

/// Split `text` into trimmed chunks of at most `max_chars` characters.
///
/// Each window prefers to end at a paragraph break, then a line break, then a
/// space, but only when that break lies in the second half of the window;
/// otherwise the window is cut hard. The next window starts `overlap`
/// characters before the previous cut. Blank chunks are dropped.
pub fn split_into_chunks(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + max_chars).min(len);
        let min_break = start + max_chars / 2 + max_chars % 2;

        let cut = BREAKS
            .iter()
            .find_map(|pattern| {
                rfind(&chars[start..end], pattern)
                    .map(|pos| start + pos)
                    .filter(|&pos| pos >= min_break)
            })
            .unwrap_or(end);

        let chunk: String = chars[start..cut].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if cut >= len {
            break;
        }
        let next = (cut + 1).saturating_sub(overlap);
        start = next.max(start + 1);
    }

    chunks
}

/// Position of the last occurrence of `pattern` fully inside `window`.
fn rfind(window: &[char], pattern: &[char]) -> Option<usize> {
    if pattern.len() > window.len() {
        return None;
    }
    (0..=window.len() - pattern.len())
        .rev()
        .find(|&i| window[i..i + pattern.len()] == *pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_into_chunks("  olá mundo  ", 1000, 100), vec!["olá mundo"]);
    }

    #[test]
    fn empty_and_blank_text_yield_nothing() {
        assert!(split_into_chunks("", 1000, 100).is_empty());
        assert!(split_into_chunks("   \n\n  ", 1000, 100).is_empty());
    }

    #[test]
    fn prefers_paragraph_break_in_second_half() {
        let text = format!("{}\n\n{}", "a".repeat(70), "b".repeat(70));
        let chunks = split_into_chunks(&text, 100, 10);
        assert_eq!(chunks[0], "a".repeat(70));
        assert!(chunks[1].ends_with(&"b".repeat(70)));
    }

    #[test]
    fn ignores_breaks_in_first_half() {
        let text = format!("{} {}", "a".repeat(10), "b".repeat(200));
        let chunks = split_into_chunks(&text, 100, 0);
        assert_eq!(chunks[0].chars().count(), 100);
    }

    #[test]
    fn chunks_never_exceed_max_and_overlap() {
        let text = "palavra ".repeat(500);
        let chunks = split_into_chunks(&text, 120, 20);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 120));
        // Consecutive chunks share text because of the overlap.
        let first = &chunks[0];
        let tail: String = first.chars().skip(first.chars().count() - 10).collect();
        assert!(chunks[1].contains(tail.trim()));
    }

    #[test]
    fn multibyte_text_is_split_on_characters() {
        let text = "ç".repeat(250);
        let chunks = split_into_chunks(&text, 100, 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert!(chunks.iter().all(|c| c.chars().all(|ch| ch == 'ç')));
    }

    #[test]
    fn large_overlap_still_terminates() {
        let chunks = split_into_chunks(&"x".repeat(50), 10, 9);
        assert!(!chunks.is_empty());
    }
}
