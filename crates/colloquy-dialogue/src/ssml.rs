// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown emphasis to SSML conversion for text-to-speech input.

/// Converts `**bold**` to strong emphasis and `*italic*` to moderate
/// emphasis, strips leftover asterisks and surrounding double quotes, and
/// wraps the result in a single `<speak>` element.
///
/// The text is XML-escaped first so that model output containing `<` or `&`
/// still yields a well-formed document.
pub fn markdown_to_ssml(text: &str) -> String {
    let escaped = escape_xml(text);
    let bold = replace_delimited(&escaped, "**", "<emphasis level=\"strong\">", "</emphasis>");
    let italic = replace_delimited(&bold, "*", "<emphasis level=\"moderate\">", "</emphasis>");
    let cleaned = italic.replace('*', "");
    let cleaned = cleaned.trim_matches('"');
    format!("<speak>{cleaned}</speak>")
}

/// Replaces each non-greedy `delim ... delim` pair with `open ... close`.
/// An unmatched trailing delimiter is left in place.
fn replace_delimited(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(delim) {
        let after_open = &rest[start + delim.len()..];
        let Some(end) = after_open.find(delim) else {
            break;
        };
        out.push_str(&rest[..start]);
        // An empty pair like `**` read as italics carries nothing to stress.
        if end > 0 {
            out.push_str(open);
            out.push_str(&after_open[..end]);
            out.push_str(close);
        }
        rest = &after_open[end + delim.len()..];
    }

    out.push_str(rest);
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic_become_emphasis() {
        let ssml = markdown_to_ssml("Isso é **importante** e *sutil*");
        assert_eq!(
            ssml,
            "<speak>Isso é <emphasis level=\"strong\">importante</emphasis> e \
             <emphasis level=\"moderate\">sutil</emphasis></speak>"
        );
        assert!(!ssml.contains('*'));
        assert_eq!(ssml.matches("<speak>").count(), 1);
        assert!(ssml.starts_with("<speak>") && ssml.ends_with("</speak>"));
    }

    #[test]
    fn stray_asterisks_and_quotes_are_removed() {
        assert_eq!(markdown_to_ssml("\"nota * solta\""), "<speak>nota  solta</speak>");
        assert_eq!(markdown_to_ssml("**aberto"), "<speak>aberto</speak>");
    }

    #[test]
    fn plain_text_is_only_wrapped() {
        assert_eq!(markdown_to_ssml("Bom dia!"), "<speak>Bom dia!</speak>");
        assert_eq!(markdown_to_ssml(""), "<speak></speak>");
    }

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(
            markdown_to_ssml("R&D <b>"),
            "<speak>R&amp;D &lt;b&gt;</speak>"
        );
    }

    #[test]
    fn list_bullets_do_not_swallow_text() {
        let ssml = markdown_to_ssml("Itens:\n* um\n* dois");
        assert!(!ssml.contains('*'));
        assert!(ssml.contains("um"));
        assert!(ssml.contains("dois"));
    }
}
