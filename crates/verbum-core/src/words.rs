//! Loose word matching across Latin inflections
//!
//! A surface heuristic, not a morphological analyzer: one enclitic and one
//! ending are stripped, then stems are compared by prefix.

use regex::Regex;
use std::sync::OnceLock;

/// Words shorter than this are compared as-is
const MIN_STEM_LEN: usize = 5;

fn enclitic() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(que)$").expect("static pattern"))
}

// Order matters: at the same start position the first alternative wins.
fn ending() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(et|us|am|i|æ|ae|o|a|um|i|em|tem|s)$").expect("static pattern"))
}

pub fn normalize(word: &str) -> String {
    let word: String = word
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ',' | '.'))
        .collect();

    if word.chars().count() < MIN_STEM_LEN {
        return word;
    }

    let without_enclitic = enclitic().replace(&word, "");
    ending().replace(&without_enclitic, "").into_owned()
}

/// True when one normalized form is a prefix of the other
pub fn words_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.starts_with(&b) || b.starts_with(&a)
}

/// Split verse text into display words. Continuous script turns commas,
/// periods and colons into breaks; the stored text is left untouched.
pub fn verse_words(text: &str, continuous: bool) -> Vec<String> {
    if continuous {
        text.chars()
            .map(|c| if matches!(c, ',' | '.' | ':') { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    } else {
        text.split_whitespace().map(str::to_string).collect()
    }
}

pub fn word_separator(continuous: bool) -> &'static str {
    if continuous {
        ""
    } else {
        " "
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_words_unchanged() {
        assert_eq!(normalize("amor"), "amor");
        assert_eq!(normalize("Deus,"), "deus");
    }

    #[test]
    fn test_strips_one_ending() {
        assert_eq!(normalize("amorem"), "amor");
        assert_eq!(normalize("Dominus"), "domin");
        assert_eq!(normalize("terram."), "terr");
        assert_eq!(normalize("caelum"), "cael");
        assert_eq!(normalize("veritatem"), "verita");
    }

    #[test]
    fn test_enclitic_stripped_before_ending() {
        assert_eq!(normalize("amoresque"), "amore");
        assert_eq!(normalize("dixitque"), "dixit");
    }

    #[test]
    fn test_ligature_ending() {
        assert_eq!(normalize("terræ"), "terr");
        assert_eq!(normalize("terrae"), "terr");
    }

    #[test]
    fn test_words_match() {
        assert!(words_match("amor", "amorem"));
        assert!(words_match("amorem", "amor"));
        assert!(words_match("Dominus", "Domine"));
        assert!(!words_match("amor", "timor"));
        assert!(!words_match("", "amor"));
        assert!(!words_match(",.", "amor"));
    }

    #[test]
    fn test_verse_words() {
        let text = "In principio erat Verbum, et Verbum erat apud Deum.";
        assert_eq!(verse_words(text, false)[3], "Verbum,");
        assert_eq!(verse_words(text, true)[3], "Verbum");
        assert_eq!(verse_words("a:b", true), vec!["a", "b"]);
        assert_eq!(word_separator(true), "");
        assert_eq!(word_separator(false), " ");
    }
}
