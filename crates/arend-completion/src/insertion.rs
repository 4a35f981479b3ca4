//
// insertion.rs
//
// What accepting a candidate does to the text. Actions are pure data; the
// editor applies them.
//

use serde::Serialize;

use crate::syntax::TextRange;

/// How a keyword is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InsertAction {
    /// Keyword plus a trailing space.
    Keyword,
    /// Keyword alone.
    BareKeyword,
    /// Keyword plus a mandatory follow-up keyword and a trailing space.
    Compound { follow: &'static str },
    /// Template whose character at `at` is replaced by `default_digit` and
    /// left selected.
    Placeholder { at: usize, default_digit: char },
}

/// Text to insert in place of the typed prefix, with cursor and selection
/// relative to the start of the insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub text: String,
    pub cursor: usize,
    pub selection: Option<(usize, usize)>,
}

impl InsertAction {
    pub fn insertion(&self, keyword: &str) -> Insertion {
        match *self {
            InsertAction::Keyword => Insertion {
                text: format!("{} ", keyword),
                cursor: keyword.len() + 1,
                selection: None,
            },
            InsertAction::BareKeyword => Insertion {
                text: keyword.to_string(),
                cursor: keyword.len(),
                selection: None,
            },
            // The cursor stays between the two keywords.
            InsertAction::Compound { follow } => Insertion {
                text: format!("{} {} ", keyword, follow),
                cursor: keyword.len(),
                selection: None,
            },
            InsertAction::Placeholder { at, default_digit } => {
                let mut text = String::with_capacity(keyword.len() + 1);
                for (i, c) in keyword.char_indices() {
                    text.push(if i == at { default_digit } else { c });
                }
                text.push(' ');
                let end = at + default_digit.len_utf8();
                Insertion {
                    text,
                    cursor: at,
                    selection: Some((at, end)),
                }
            }
        }
    }
}

/// One completion proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub keyword: &'static str,
    pub display_text: &'static str,
    pub priority: f64,
    pub action: InsertAction,
    /// Name of the rule that produced the candidate.
    pub rule: &'static str,
    /// Text the insertion replaces: the typed prefix.
    pub replace: TextRange,
}

impl Candidate {
    pub fn insertion(&self) -> Insertion {
        self.action.insertion(self.keyword)
    }

    /// Apply the candidate to `text`, returning the new text and the
    /// absolute cursor offset.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let insertion = self.insertion();
        let start = self.replace.start.min(text.len());
        let end = self.replace.end.clamp(start, text.len());
        let mut result = String::with_capacity(text.len() + insertion.text.len());
        result.push_str(&text[..start]);
        result.push_str(&insertion.text);
        result.push_str(&text[end..]);
        (result, start + insertion.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords;

    fn candidate(keyword: &'static str, action: InsertAction, replace: TextRange) -> Candidate {
        Candidate {
            keyword,
            display_text: keyword,
            priority: 0.0,
            action,
            rule: "test",
            replace,
        }
    }

    #[test]
    fn test_keyword_adds_space() {
        let insertion = InsertAction::Keyword.insertion(keywords::CASE);
        assert_eq!(insertion.text, "\\case ");
        assert_eq!(insertion.cursor, 6);
        assert_eq!(insertion.selection, None);
    }

    #[test]
    fn test_bare_keyword() {
        let insertion = InsertAction::BareKeyword.insertion(keywords::WITH);
        assert_eq!(insertion.text, "\\with");
        assert_eq!(insertion.cursor, 5);
    }

    #[test]
    fn test_compound_places_cursor_between_keywords() {
        let action = InsertAction::Compound {
            follow: keywords::DATA,
        };
        let insertion = action.insertion(keywords::TRUNCATED);
        assert_eq!(insertion.text, "\\truncated \\data ");
        assert_eq!(insertion.cursor, "\\truncated".len());
    }

    #[test]
    fn test_placeholder_selects_digit() {
        let action = InsertAction::Placeholder {
            at: 1,
            default_digit: '1',
        };
        let insertion = action.insertion(keywords::N_TYPE);
        assert_eq!(insertion.text, "\\1-Type ");
        assert_eq!(insertion.cursor, 1);
        assert_eq!(insertion.selection, Some((1, 2)));
    }

    #[test]
    fn test_apply_replaces_typed_prefix() {
        let text = "\\func f => \\ca";
        let c = candidate(keywords::CASE, InsertAction::Keyword, TextRange::new(11, 14));
        let (result, cursor) = c.apply(text);
        assert_eq!(result, "\\func f => \\case ");
        assert_eq!(cursor, result.len());
    }

    #[test]
    fn test_apply_clamps_out_of_range() {
        let c = candidate(keywords::NEW, InsertAction::BareKeyword, TextRange::new(10, 20));
        let (result, cursor) = c.apply("x");
        assert_eq!(result, "x\\new");
        assert_eq!(cursor, 5);
    }
}
