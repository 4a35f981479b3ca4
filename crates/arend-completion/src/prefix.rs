//
// prefix.rs
//
// Prefix computation and matching for keyword candidates.
//

use std::sync::OnceLock;

use regex::Regex;

/// Characters that may appear in an Arend identifier besides letters and
/// digits.
const IDENTIFIER_SYMBOLS: &str = "~!@#$%^&*-+=<>?/|[]:_'";

pub fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || IDENTIFIER_SYMBOLS.contains(c)
}

/// Compute the prefix keywords are matched against.
///
/// Keeps the trailing run of identifier characters of `raw_prefix`; when
/// the character right before that run in `text` is the escape marker it
/// becomes part of the prefix, so `\ca` matches `\case` but `ca` does not.
pub fn compute_prefix(text: &str, offset: usize, raw_prefix: &str) -> String {
    let start = raw_prefix
        .char_indices()
        .filter(|(_, c)| !is_identifier_part(*c))
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    let prefix = &raw_prefix[start..];

    let escaped = offset
        .checked_sub(prefix.len())
        .and_then(|word_start| text.get(..word_start))
        .is_some_and(|before| before.ends_with('\\'));

    if escaped {
        format!("\\{}", prefix)
    } else {
        prefix.to_string()
    }
}

fn numbered_universe_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\\[0-9]+(-(T(y(pe?)?)?)?)?$").expect("numbered universe pattern is valid")
    })
}

fn universe_level_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\[0-9]+-?").expect("universe level pattern is valid"))
}

/// Typed text of a truncated universe being written, e.g. `\2`, `\2-`,
/// `\2-Ty`.
pub fn is_numbered_universe(typed: &str) -> bool {
    numbered_universe_regex().is_match(typed)
}

/// Drop the `\<digits>-` head of a numbered universe prefix.
pub fn strip_universe_level(prefix: &str) -> String {
    universe_level_regex().replace_all(prefix, "").into_owned()
}

/// Literal start-of-string matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatcher {
    prefix: String,
    case_sensitive: bool,
}

impl PrefixMatcher {
    pub fn new(prefix: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            prefix: prefix.into(),
            case_sensitive,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.case_sensitive {
            return name.starts_with(&self.prefix);
        }
        let (name, prefix) = (name.as_bytes(), self.prefix.as_bytes());
        name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prefix_keeps_escape_marker() {
        assert_eq!(compute_prefix("x \\ca", 5, "\\ca"), "\\ca");
        assert_eq!(compute_prefix("x ca", 4, "ca"), "ca");
        assert_eq!(compute_prefix("(\\la", 4, "(\\la"), "\\la");
    }

    #[test]
    fn test_prefix_trailing_identifier_run() {
        assert_eq!(compute_prefix("f.\\le", 5, "f.\\le"), "\\le");
        assert_eq!(compute_prefix("a b", 3, "a b"), "b");
        assert_eq!(compute_prefix("", 0, ""), "");
        // Symbols are identifier characters in Arend.
        assert_eq!(compute_prefix("x+-y", 4, "x+-y"), "x+-y");
    }

    #[test]
    fn test_numbered_universe() {
        assert!(is_numbered_universe("\\1"));
        assert!(is_numbered_universe("\\12-"));
        assert!(is_numbered_universe("\\2-Typ"));
        assert!(is_numbered_universe("\\2-Type"));
        assert!(!is_numbered_universe("\\2-Types"));
        assert!(!is_numbered_universe("\\Type"));
        assert!(!is_numbered_universe("2-Type"));
        assert_eq!(strip_universe_level("\\2-Ty"), "Ty");
        assert_eq!(strip_universe_level("\\10"), "");
    }

    #[test]
    fn test_matcher_case_handling() {
        let insensitive = PrefixMatcher::new("\\pi", false);
        assert!(insensitive.matches("\\Pi"));
        assert!(!insensitive.matches("\\lp"));
        let sensitive = PrefixMatcher::new("\\pi", true);
        assert!(!sensitive.matches("\\Pi"));
        assert!(PrefixMatcher::new("", true).matches("\\with"));
        assert!(!PrefixMatcher::new("\\withx", false).matches("\\with"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The computed prefix is always a suffix of the text before the
        /// cursor and never contains non-identifier characters past `\`.
        #[test]
        fn prop_prefix_is_suffix_of_text(text in "[a-z \\\\(.]{0,20}") {
            let prefix = compute_prefix(&text, text.len(), &text);
            prop_assert!(text.ends_with(&prefix));
            let body = prefix.strip_prefix('\\').unwrap_or(&prefix);
            prop_assert!(body.chars().all(is_identifier_part));
        }

        /// Every keyword matches its own prefixes.
        #[test]
        fn prop_keyword_matches_own_prefix(
            word in prop::sample::select(crate::keywords::ALL_KEYWORDS),
            len in 0usize..12,
        ) {
            let cut = len.min(word.len());
            prop_assert!(PrefixMatcher::new(&word[..cut], true).matches(word));
            prop_assert!(PrefixMatcher::new(word[..cut].to_uppercase(), false).matches(word));
        }
    }
}
