//! Keyword vocabulary for Arend.
//!
//! This module provides every keyword the completion rules can offer, grouped
//! the way the rules offer them, plus a lookup to check whether a word is an
//! Arend keyword. All keywords start with the escape marker `\`.

pub const FUNC: &str = "\\func";
pub const LEMMA: &str = "\\lemma";
pub const DATA: &str = "\\data";
pub const CLASS: &str = "\\class";
pub const RECORD: &str = "\\record";
pub const INSTANCE: &str = "\\instance";
pub const OPEN: &str = "\\open";
pub const MODULE: &str = "\\module";
pub const IMPORT: &str = "\\import";
pub const USING: &str = "\\using";
pub const HIDING: &str = "\\hiding";
pub const AS: &str = "\\as";
pub const TRUNCATED: &str = "\\truncated";
pub const FIELD: &str = "\\field";
pub const PROPERTY: &str = "\\property";
pub const USE: &str = "\\use";
pub const COERCE: &str = "\\coerce";
pub const LEVEL: &str = "\\level";
pub const WHERE: &str = "\\where";
pub const EXTENDS: &str = "\\extends";
pub const WITH: &str = "\\with";
pub const COWITH: &str = "\\cowith";
pub const ELIM: &str = "\\elim";
pub const NEW: &str = "\\new";
pub const PI: &str = "\\Pi";
pub const SIGMA: &str = "\\Sigma";
pub const LAM: &str = "\\lam";
pub const LET: &str = "\\let";
pub const IN: &str = "\\in";
pub const CASE: &str = "\\case";
pub const RETURN: &str = "\\return";
pub const CLASSIFYING: &str = "\\classifying";
pub const TYPE: &str = "\\Type";
pub const SET: &str = "\\Set";
pub const PROP: &str = "\\Prop";
pub const OO_TYPE: &str = "\\oo-Type";
/// Template for `\1-Type`, `\2-Type`, ...; the `n` is replaced on insertion.
pub const N_TYPE: &str = "\\n-Type";
pub const LP: &str = "\\lp";
pub const LH: &str = "\\lh";
pub const SUC: &str = "\\suc";
pub const MAX: &str = "\\max";

pub const FIXITY_KWS: &[&str] = &[
    "\\infix", "\\infixl", "\\infixr", "\\fix", "\\fixl", "\\fixr",
];

/// Keywords that start a statement.
pub const STATEMENT_KWS: &[&str] = &[FUNC, LEMMA, DATA, CLASS, RECORD, INSTANCE, OPEN, MODULE];

pub const TRUNCATED_KWS: &[&str] = &[TRUNCATED];
pub const IMPORT_KWS: &[&str] = &[IMPORT];
pub const CLASS_MEMBER_KWS: &[&str] = &[FIELD, PROPERTY];
pub const USE_KWS: &[&str] = &[USE];
pub const COERCE_LEVEL_KWS: &[&str] = &[COERCE, LEVEL];
pub const DATA_KWS: &[&str] = &[DATA];
pub const WHERE_KWS: &[&str] = &[WHERE];
pub const EXTENDS_KWS: &[&str] = &[EXTENDS];
pub const DATA_UNIVERSE_KWS: &[&str] = &[TYPE, SET, PROP, OO_TYPE];
pub const BASIC_EXPRESSION_KWS: &[&str] = &[PI, SIGMA, LAM, LET, CASE];
pub const NEW_KWS: &[&str] = &[NEW];
pub const FAKE_NTYPE_KWS: &[&str] = &[N_TYPE];
pub const LPH_KWS: &[&str] = &[LP, LH];
pub const LPH_LEVEL_KWS: &[&str] = &[LP, LH, SUC, MAX];
pub const IN_KWS: &[&str] = &[IN];
pub const WITH_KWS: &[&str] = &[WITH];
pub const AS_KWS: &[&str] = &[AS];
pub const RETURN_KWS: &[&str] = &[RETURN];
pub const ELIM_KWS: &[&str] = &[ELIM];
pub const COWITH_KWS: &[&str] = &[COWITH];
pub const LEVEL_KWS: &[&str] = &[LEVEL];
pub const CLASSIFYING_KWS: &[&str] = &[CLASSIFYING];
pub const USING_KWS: &[&str] = &[USING];
pub const HIDING_KWS: &[&str] = &[HIDING];
pub const HU_KWS: &[&str] = &[HIDING, USING];

/// Completions for the rest of a numbered universe being typed, as in
/// `\2` -> `\2-Type` and `\2-Ty` -> `\2-Type`.
pub const TYPE_SUFFIX_KWS: &[&str] = &["-Type"];
pub const TYPE_WORD_KWS: &[&str] = &["Type"];

/// Every keyword the engine can offer, `\n-Type` template excluded.
pub const ALL_KEYWORDS: &[&str] = &[
    FUNC, LEMMA, DATA, CLASS, RECORD, INSTANCE, OPEN, MODULE, IMPORT, USING, HIDING, AS,
    TRUNCATED, FIELD, PROPERTY, USE, COERCE, LEVEL, WHERE, EXTENDS, WITH, COWITH, ELIM, NEW, PI,
    SIGMA, LAM, LET, IN, CASE, RETURN, CLASSIFYING, TYPE, SET, PROP, OO_TYPE, LP, LH, SUC, MAX,
    "\\infix", "\\infixl", "\\infixr", "\\fix", "\\fixl", "\\fixr",
];

/// Check if a word is an Arend keyword.
///
/// The check is case-sensitive and requires the leading `\`.
///
/// # Examples
///
/// ```
/// use arend_completion::keywords::is_keyword;
///
/// assert!(is_keyword("\\func"));
/// assert!(is_keyword("\\oo-Type"));
/// assert!(!is_keyword("func"));
/// assert!(!is_keyword("\\Func"));
/// ```
pub fn is_keyword(word: &str) -> bool {
    ALL_KEYWORDS.contains(&word)
}
