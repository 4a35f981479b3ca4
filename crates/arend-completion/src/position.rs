//
// position.rs
//
// Resolves the completion position: the token being typed, its nearest
// significant neighbours, and where the cursor sits relative to statement
// boundaries. Works on error-recovered trees, so every step tolerates
// missing or misplaced nodes.
//

use smallvec::SmallVec;

use crate::syntax::{Element, NodeId, NodeKind, SyntaxTree, TokenId, TokenKind};

/// Identifier an editor splices at the cursor before parsing, so that the
/// completion position is always a real token.
pub const PLACEHOLDER_IDENTIFIER: &str = "arendCompletionPlaceholder";

/// Element chain from a token up to the nearest statement-like node.
pub type AncestorChain = SmallVec<[Element; 16]>;

/// Everything the rules need to know about the cursor surroundings.
#[derive(Debug, Clone)]
pub struct PositionContext {
    /// Word-like token under (or ending at) the cursor.
    pub position: TokenId,
    /// Nearest non-trivia token left of `position`.
    pub prev_token: Option<TokenId>,
    /// Nearest non-trivia token right of `position`.
    pub next_token: Option<TokenId>,
    pub ancestors_of_prev: AncestorChain,
    pub ancestors_of_next: AncestorChain,
    /// A line break (or the start of the file) separates `prev_token`
    /// from the cursor.
    pub line_break_before_cursor: bool,
    /// `prev_token` is the `{` of a statement holder.
    pub at_left_brace: bool,
    /// `next_token` is the `}` of a statement holder.
    pub at_right_brace: bool,
    pub left_statement: Option<Element>,
    pub right_statement: Option<Element>,
    pub is_before_class_fields: bool,
    pub is_between_statements: bool,
}

/// Resolve the position context at `offset`.
///
/// Returns `None` when no word-like token covers or ends at the cursor,
/// i.e. the tree carries no completion position.
pub fn resolve(tree: &SyntaxTree, offset: usize) -> Option<PositionContext> {
    let position = position_token(tree, offset)?;

    let next_token = scan_right(tree, position);
    let (prev_token, line_break_before_cursor) = scan_left(tree, position);

    let ancestors_of_prev = ancestors_until_statement(tree, prev_token);
    let ancestors_of_next = ancestors_until_statement(tree, next_token);

    let at_left_brace = prev_token.is_some_and(|t| is_holder_brace(tree, t, TokenKind::LBrace));
    let at_right_brace = next_token.is_some_and(|t| is_holder_brace(tree, t, TokenKind::RBrace));

    let left_statement = ancestors_of_prev.last().copied();
    let right_statement = ancestors_of_next.last().copied();

    let is_before_class_fields = match right_statement {
        Some(Element::Node(stat)) => {
            tree.node_kind(stat) == NodeKind::ClassStat
                && !tree
                    .child_nodes(stat)
                    .any(|child| tree.node_kind(child).is_group())
        }
        _ => false,
    };

    let is_between_statements = left_statement.is_some()
        && right_statement.is_some()
        && !is_before_class_fields
        && !ancestors_of_prev
            .iter()
            .any(|element| ancestors_of_next.contains(element));

    Some(PositionContext {
        position,
        prev_token,
        next_token,
        ancestors_of_prev,
        ancestors_of_next,
        line_break_before_cursor,
        at_left_brace,
        at_right_brace,
        left_statement,
        right_statement,
        is_before_class_fields,
        is_between_statements,
    })
}

/// The word-like token covering `offset`, else the one ending at it.
pub fn position_token(tree: &SyntaxTree, offset: usize) -> Option<TokenId> {
    let is_word = |token: &TokenId| tree.token_kind(*token).is_word();
    tree.token_at_offset(offset)
        .filter(is_word)
        .or_else(|| tree.token_ending_at(offset).filter(is_word))
}

fn scan_right(tree: &SyntaxTree, position: TokenId) -> Option<TokenId> {
    let mut current = tree.next_token(position);
    while let Some(token) = current {
        if !tree.token_kind(token).is_trivia() {
            return Some(token);
        }
        current = tree.next_token(token);
    }
    None
}

/// Walk left from `position`, returning the first significant token and
/// whether a line break (or the file start) was crossed.
///
/// A malformed token is stepped over only when it is the very first token
/// met: a stray escape marker or bad character right before the cursor
/// must not hide the real left neighbour.
fn scan_left(tree: &SyntaxTree, position: TokenId) -> (Option<TokenId>, bool) {
    let mut line_break = false;
    let mut first = true;
    let mut current = tree.prev_token(position);

    while let Some(token) = current {
        let kind = tree.token_kind(token);
        let range = tree.token_range(token);

        let skip = if kind.is_trivia() {
            if kind == TokenKind::Whitespace && tree.token_text(token).contains('\n') {
                line_break = true;
            }
            true
        } else {
            first && is_malformed(tree, token)
        };
        first = false;

        if !skip {
            // The scan also reaches the file start when the neighbour is a
            // single character at offset 0.
            if range.end <= 1 {
                line_break = true;
            }
            return (Some(token), line_break);
        }
        if range.start == 0 {
            line_break = true;
        }
        current = tree.prev_token(token);
    }

    (None, true)
}

fn is_malformed(tree: &SyntaxTree, token: TokenId) -> bool {
    match tree.token_kind(token) {
        TokenKind::BadCharacter => true,
        TokenKind::InvalidKeyword => {
            tree.node_kind(tree.token_parent(token)) == NodeKind::Error
                && tree.token_text(token).starts_with('\\')
        }
        _ => false,
    }
}

/// A `Statement` not directly inside a brace-less `\where`, or any
/// `ClassStat`.
fn is_statement_like(tree: &SyntaxTree, node: NodeId) -> bool {
    match tree.node_kind(node) {
        NodeKind::Statement => match tree.node_parent(node) {
            Some(parent) => {
                tree.node_kind(parent) != NodeKind::Where
                    || tree.has_child_token(parent, TokenKind::LBrace)
            }
            None => true,
        },
        NodeKind::ClassStat => true,
        _ => false,
    }
}

/// `token` itself, then its ancestors up to and including the first
/// statement-like node (or the root when there is none).
fn ancestors_until_statement(tree: &SyntaxTree, token: Option<TokenId>) -> AncestorChain {
    let mut chain = AncestorChain::new();
    let Some(token) = token else {
        return chain;
    };
    chain.push(Element::Token(token));
    for node in tree.token_ancestors(token) {
        chain.push(Element::Node(node));
        if is_statement_like(tree, node) {
            break;
        }
    }
    chain
}

/// A brace owned by a `\where` block or by a class body without `=>`.
fn is_holder_brace(tree: &SyntaxTree, token: TokenId, brace: TokenKind) -> bool {
    if tree.token_kind(token) != brace {
        return false;
    }
    let parent = tree.token_parent(token);
    match tree.node_kind(parent) {
        NodeKind::Where => true,
        NodeKind::DefClass => !tree.has_child_token(parent, TokenKind::FatArrow),
        _ => false,
    }
}
