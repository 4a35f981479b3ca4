//
// pattern.rs
//
// Composable predicates over a token and its ancestors. Patterns are plain
// `const` data so that the named contexts in `contexts.rs` are constants.
//

use crate::syntax::{Element, NodeKind, SyntaxTree, TokenId, TokenKind};

/// A predicate over a token's kind, its preceding leaf and its ancestors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// Matches every token.
    Any,
    /// The token has one of these kinds.
    TypeIs(&'static [TokenKind]),
    /// The previous non-trivia leaf has this kind.
    AfterLeaf(TokenKind),
    /// The parent node has this kind.
    Parent(NodeKind),
    /// The ancestor `level` steps up has this kind (1 is the parent).
    SuperParent(usize, NodeKind),
    /// The ancestor `level` steps up is an expression.
    ExprAt(usize),
    /// The 1st..nth ancestors have these kinds, in order.
    Ancestors(&'static [NodeKind]),
    And(&'static [Pattern]),
    Or(&'static [Pattern]),
    Not(&'static Pattern),
}

impl Pattern {
    pub fn matches(&self, tree: &SyntaxTree, token: TokenId) -> bool {
        match *self {
            Pattern::Any => true,
            Pattern::TypeIs(kinds) => kinds.contains(&tree.token_kind(token)),
            Pattern::AfterLeaf(kind) => tree
                .prev_significant_token(token)
                .is_some_and(|prev| tree.token_kind(prev) == kind),
            Pattern::Parent(kind) => tree.node_kind(tree.token_parent(token)) == kind,
            Pattern::SuperParent(level, kind) => tree
                .super_parent(Element::Token(token), level)
                .is_some_and(|node| tree.node_kind(node) == kind),
            Pattern::ExprAt(level) => tree
                .super_parent(Element::Token(token), level)
                .is_some_and(|node| tree.node_kind(node).is_expr()),
            Pattern::Ancestors(kinds) => {
                let mut ancestors = tree.token_ancestors(token);
                kinds.iter().all(|kind| {
                    ancestors
                        .next()
                        .is_some_and(|node| tree.node_kind(node) == *kind)
                })
            }
            Pattern::And(patterns) => patterns.iter().all(|p| p.matches(tree, token)),
            Pattern::Or(patterns) => patterns.iter().any(|p| p.matches(tree, token)),
            Pattern::Not(pattern) => !pattern.matches(tree, token),
        }
    }

    /// Like [`Pattern::matches`], but an absent token never matches.
    pub fn matches_opt(&self, tree: &SyntaxTree, token: Option<TokenId>) -> bool {
        token.is_some_and(|token| self.matches(tree, token))
    }
}
