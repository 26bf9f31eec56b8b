// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name plausibility check.
//!
//! A heuristic gate deciding whether a push name or a reply to the name
//! question looks like a person's name. Short or symbol-free-but-odd names
//! may be rejected; that is accepted.

/// Minimum number of characters after trimming.
const MIN_NAME_CHARS: usize = 3;

/// Code point ranges treated as emoji or pictographs.
const PICTOGRAPHIC_RANGES: [(u32, u32); 6] = [
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x1F1E0, 0x1F1FF),
    (0x2702, 0x27B0),
    (0x24C2, 0x1F251),
];

fn is_pictographic(c: char) -> bool {
    let cp = c as u32;
    PICTOGRAPHIC_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Returns true when `candidate` plausibly is a display name.
pub fn is_plausible_name(candidate: Option<&str>) -> bool {
    let Some(name) = candidate.map(str::trim) else {
        return false;
    };

    name.chars().count() >= MIN_NAME_CHARS
        && name.chars().any(char::is_alphabetic)
        && !name.chars().any(is_pictographic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn gate_examples() {
        assert!(!is_plausible_name(Some("Jo")));
        assert!(is_plausible_name(Some("João")));
        assert!(!is_plausible_name(Some("😀😀😀")));
        assert!(!is_plausible_name(Some("")));
        assert!(!is_plausible_name(None));
    }

    #[test]
    fn whitespace_does_not_count_toward_length() {
        assert!(!is_plausible_name(Some("  Al  ")));
        assert!(is_plausible_name(Some("  Ana  ")));
    }

    #[test]
    fn requires_a_letter() {
        assert!(!is_plausible_name(Some("123")));
        assert!(!is_plausible_name(Some("...")));
        assert!(is_plausible_name(Some("R2D2")));
    }

    #[test]
    fn emoji_anywhere_rejects() {
        assert!(!is_plausible_name(Some("Maria 🌸")));
        assert!(!is_plausible_name(Some("Pedro ✂")));
        assert!(!is_plausible_name(Some("Ana 🇧🇷")));
    }

    #[test]
    fn accented_latin_names_pass() {
        for name in ["Conceição", "Zoë", "Åsa Öberg", "José da Silva"] {
            assert!(is_plausible_name(Some(name)), "{name}");
        }
    }

    proptest! {
        #[test]
        fn short_inputs_never_pass(s in "\\PC{0,2}") {
            prop_assert!(!is_plausible_name(Some(&s)));
        }

        #[test]
        fn ascii_words_of_three_or_more_pass(s in "[A-Za-z]{3,20}") {
            prop_assert!(is_plausible_name(Some(&s)));
        }
    }
}
