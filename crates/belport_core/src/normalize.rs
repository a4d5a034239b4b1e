/// Characters the page sprinkles into cell text that render as nothing.
const INVISIBLE_CHARS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Canonical form of one visible text fragment: invisible characters removed,
/// every whitespace run (NBSP included) collapsed to one ASCII space, trimmed.
/// An empty result means the fragment carries no line.
pub fn clean_line(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if INVISIBLE_CHARS.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !output.is_empty();
            continue;
        }
        if pending_space {
            output.push(' ');
            pending_space = false;
        }
        output.push(ch);
    }
    output
}

/// Separator rows, bullets and similar filler: no letter or digit anywhere.
pub fn is_decorative(line: &str) -> bool {
    !line.chars().any(char::is_alphanumeric)
}

/// Case-insensitive prefix strip, compared char by char so `Å` matches `å`.
pub fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let mut rest = line.chars();
    for expected in label.chars() {
        let actual = rest.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(rest.as_str())
}

/// Integer tokens of a line in order; anything that is not a whole
/// (optionally signed) integer token is skipped.
pub fn integer_tokens(text: &str) -> Vec<i64> {
    text.split_whitespace()
        .filter_map(|token| token.parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{clean_line, integer_tokens, is_decorative, strip_label};

    #[test]
    fn clean_line_strips_invisible_characters_and_collapses_whitespace() {
        assert_eq!(clean_line("\u{FEFF}  Ward\u{200B} A \t\n"), "Ward A");
        assert_eq!(clean_line("Lediga\u{00A0}\u{00A0}platser"), "Lediga platser");
        assert_eq!(clean_line("a\u{2003}\u{2003}b"), "a b");
    }

    #[test]
    fn clean_line_yields_empty_for_blank_input() {
        assert_eq!(clean_line(""), "");
        assert_eq!(clean_line(" \u{200B}\u{00A0}\r\n"), "");
    }

    #[test]
    fn decorative_lines_have_no_alphanumerics() {
        assert!(is_decorative("-"));
        assert!(is_decorative("| • |"));
        assert!(!is_decorative("Ward A"));
        assert!(!is_decorative("- 3 -"));
    }

    #[test]
    fn strip_label_ignores_case_and_respects_char_boundaries() {
        assert_eq!(strip_label("TEL: 555", "Tel:"), Some(" 555"));
        assert_eq!(strip_label("Område: Syd", "Område:"), Some(" Syd"));
        assert_eq!(strip_label("OMRÅDE: Syd", "Område:"), Some(" Syd"));
        assert_eq!(strip_label("väntande 3", "VÄNTANDE"), Some(" 3"));
        assert_eq!(strip_label("Omr", "Område:"), None);
        assert_eq!(strip_label("åäö", "ab"), None);
    }

    #[test]
    fn integer_tokens_skip_dates_and_phone_numbers() {
        assert_eq!(integer_tokens("12 -3 +2"), vec![12, -3, 2]);
        assert_eq!(integer_tokens("2024-01-15 08:00 555-1234"), Vec::<i64>::new());
    }
}
