//
// syntax/kind.rs
//
// Node and token kinds of the Arend syntax tree handed over by the parser.
//

use serde::{Deserialize, Serialize};

/// Grammar productions the completion rules can observe.
///
/// Names follow the Arend grammar. `Error` is the recovery node the parser
/// emits in place of a production it could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Statement,
    StatCmd,
    NsUsing,
    NsId,
    Where,
    DefFunction,
    DefData,
    DefClass,
    DefInstance,
    DefModule,
    FunctionBody,
    DataBody,
    InstanceBody,
    Constructor,
    ConstructorClause,
    Clause,
    CoClause,
    Elim,
    NameTele,
    TypeTele,
    FieldTele,
    ClassStat,
    ClassField,
    ClassFieldSyn,
    ClassImplement,
    DefIdentifier,
    FieldDefIdentifier,
    RefIdentifier,
    IdentifierOrUnknown,
    LongName,
    Literal,
    Atom,
    AtomFieldsAcc,
    FieldAcc,
    AtomArgument,
    ArgumentAppExpr,
    LongNameExpr,
    LevelsExpr,
    AtomLevelExpr,
    AtomOnlyLevelExpr,
    LevelExpr,
    NewExpr,
    PiExpr,
    SigmaExpr,
    LamExpr,
    LetExpr,
    LetClause,
    CaseExpr,
    CaseArg,
    ArrExpr,
    TupleExpr,
    Tuple,
    ReturnExpr,
    UniverseAppExpr,
    SetUniverseAppExpr,
    TruncatedUniverseAppExpr,
    UniverseAtom,
    Error,
}

impl NodeKind {
    /// Productions of the `expr` family.
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            NodeKind::NewExpr
                | NodeKind::PiExpr
                | NodeKind::SigmaExpr
                | NodeKind::LamExpr
                | NodeKind::LetExpr
                | NodeKind::CaseExpr
                | NodeKind::ArrExpr
                | NodeKind::ArgumentAppExpr
                | NodeKind::UniverseAppExpr
                | NodeKind::SetUniverseAppExpr
                | NodeKind::TruncatedUniverseAppExpr
        )
    }

    /// Definitions that may own a `\where` block.
    pub fn is_group(self) -> bool {
        self.is_definition() || self == NodeKind::DefModule
    }

    pub fn is_definition(self) -> bool {
        matches!(
            self,
            NodeKind::DefFunction | NodeKind::DefData | NodeKind::DefClass | NodeKind::DefInstance
        )
    }
}

/// Leaf token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    DocComment,

    Id,
    Number,
    String,
    /// An escape marker followed by something that is not a keyword.
    InvalidKeyword,
    BadCharacter,

    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Dot,
    Comma,
    Pipe,
    Arrow,
    FatArrow,
    Underscore,

    OpenKw,
    ImportKw,
    UsingKw,
    AsKw,
    HidingKw,
    FunctionKw,
    LemmaKw,
    CoerceKw,
    DataKw,
    ClassKw,
    RecordKw,
    ModuleKw,
    InstanceKw,
    TruncatedKw,
    FieldKw,
    PropertyKw,
    ClassifyingKw,
    WhereKw,
    WithKw,
    UseKw,
    CowithKw,
    ElimKw,
    NewKw,
    PiKw,
    SigmaKw,
    LamKw,
    LetKw,
    InKw,
    CaseKw,
    ReturnKw,
    ExtendsKw,
    PropKw,
    LpKw,
    LhKw,
    SucKw,
    MaxKw,
    LevelKw,
    InfixNonKw,
    InfixLeftKw,
    InfixRightKw,
    NonAssocKw,
    LeftAssocKw,
    RightAssocKw,
    /// `\Set`, `\Set0`, ...
    Set,
    /// `\Type`, `\Type2`, ...
    Universe,
    /// `\oo-Type`, `\1-Type`, ...
    TruncatedUniverse,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        self == TokenKind::Whitespace || self.is_comment()
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }

    pub fn is_keyword(self) -> bool {
        !self.is_trivia()
            && !matches!(
                self,
                TokenKind::Id
                    | TokenKind::Number
                    | TokenKind::String
                    | TokenKind::InvalidKeyword
                    | TokenKind::BadCharacter
                    | TokenKind::LParen
                    | TokenKind::RParen
                    | TokenKind::LBrace
                    | TokenKind::RBrace
                    | TokenKind::Colon
                    | TokenKind::Dot
                    | TokenKind::Comma
                    | TokenKind::Pipe
                    | TokenKind::Arrow
                    | TokenKind::FatArrow
                    | TokenKind::Underscore
            )
    }

    /// Tokens the user can be in the middle of typing.
    pub fn is_word(self) -> bool {
        matches!(self, TokenKind::Id | TokenKind::InvalidKeyword) || self.is_keyword()
    }

    /// Punctuation that never names anything.
    pub fn is_punctuation(self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Colon
                | TokenKind::Comma
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::BlockComment.is_trivia());
        assert!(!TokenKind::Id.is_trivia());
        assert!(!TokenKind::BadCharacter.is_trivia());
    }

    #[test]
    fn test_keyword_and_word_classification() {
        assert!(TokenKind::CaseKw.is_keyword());
        assert!(TokenKind::Universe.is_keyword());
        assert!(!TokenKind::FatArrow.is_keyword());
        assert!(!TokenKind::LineComment.is_keyword());
        assert!(TokenKind::InvalidKeyword.is_word());
        assert!(TokenKind::WithKw.is_word());
        assert!(!TokenKind::Number.is_word());
    }

    #[test]
    fn test_expression_and_group_classes() {
        assert!(NodeKind::CaseExpr.is_expr());
        assert!(NodeKind::ArgumentAppExpr.is_expr());
        assert!(!NodeKind::UniverseAtom.is_expr());
        assert!(!NodeKind::TupleExpr.is_expr());
        assert!(NodeKind::DefModule.is_group());
        assert!(!NodeKind::DefModule.is_definition());
        assert!(!NodeKind::File.is_group());
    }
}
