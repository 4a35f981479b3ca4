//
// syntax/tree.rs
//
// Arena-allocated, read-only syntax tree with parent back-references.
//

use serde::Serialize;

use super::kind::{NodeKind, TokenKind};

/// Index of a node in its tree's arena. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// Index of a token in its tree's arena. Token ids follow document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub(crate) u32);

/// A child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Node(NodeId),
    Token(TokenId),
}

/// Half-open byte range into the tree's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `start <= offset < end`
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// `start < offset < end`
    pub fn strictly_contains(&self, offset: usize) -> bool {
        self.start < offset && offset < self.end
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index: usize,
    pub(crate) children: Vec<Element>,
    pub(crate) range: TextRange,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenData {
    pub(crate) kind: TokenKind,
    pub(crate) parent: NodeId,
    pub(crate) index: usize,
    pub(crate) range: TextRange,
}

/// Immutable syntax tree produced by [`super::TreeBuilder`].
///
/// Every token belongs to exactly one node, trivia included, and the
/// concatenated token texts reproduce [`SyntaxTree::text`].
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) text: String,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) tokens: Vec<TokenData>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0 as usize]
    }

    fn token(&self, id: TokenId) -> &TokenData {
        &self.tokens[id.0 as usize]
    }

    // ------------------------------------------------------------------
    // Kinds, ranges, text
    // ------------------------------------------------------------------

    pub fn node_kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn token_kind(&self, id: TokenId) -> TokenKind {
        self.token(id).kind
    }

    /// Node kind of an element, `None` for tokens.
    pub fn element_node_kind(&self, element: Element) -> Option<NodeKind> {
        match element {
            Element::Node(id) => Some(self.node_kind(id)),
            Element::Token(_) => None,
        }
    }

    /// Token kind of an element, `None` for nodes.
    pub fn element_token_kind(&self, element: Element) -> Option<TokenKind> {
        match element {
            Element::Token(id) => Some(self.token_kind(id)),
            Element::Node(_) => None,
        }
    }

    pub fn node_range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn token_range(&self, id: TokenId) -> TextRange {
        self.token(id).range
    }

    pub fn element_range(&self, element: Element) -> TextRange {
        match element {
            Element::Node(id) => self.node_range(id),
            Element::Token(id) => self.token_range(id),
        }
    }

    pub fn token_text(&self, id: TokenId) -> &str {
        let range = self.token_range(id);
        &self.text[range.start..range.end]
    }

    pub fn node_text(&self, id: NodeId) -> &str {
        let range = self.node_range(id);
        &self.text[range.start..range.end]
    }

    pub fn element_text(&self, element: Element) -> &str {
        let range = self.element_range(element);
        &self.text[range.start..range.end]
    }

    /// Whether the element is a trivia token. Nodes are never trivia.
    pub fn is_trivia(&self, element: Element) -> bool {
        matches!(element, Element::Token(id) if self.token_kind(id).is_trivia())
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn token_parent(&self, id: TokenId) -> NodeId {
        self.token(id).parent
    }

    pub fn node_parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn parent(&self, element: Element) -> Option<NodeId> {
        match element {
            Element::Node(id) => self.node_parent(id),
            Element::Token(id) => Some(self.token_parent(id)),
        }
    }

    pub fn children(&self, id: NodeId) -> &[Element] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<Element> {
        self.children(id).first().copied()
    }

    /// Child nodes of `id`, skipping tokens.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().filter_map(|child| match child {
            Element::Node(node) => Some(*node),
            Element::Token(_) => None,
        })
    }

    /// Child nodes of `id` with the given kind.
    pub fn child_nodes_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.child_nodes(id)
            .filter(move |child| self.node_kind(*child) == kind)
    }

    /// First child node of `id` with the given kind.
    pub fn child_node(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.child_nodes_of_kind(id, kind).next()
    }

    /// First direct child token of `id` with the given kind.
    pub fn child_token(&self, id: NodeId, kind: TokenKind) -> Option<TokenId> {
        self.children(id).iter().find_map(|child| match child {
            Element::Token(token) if self.token_kind(*token) == kind => Some(*token),
            _ => None,
        })
    }

    pub fn has_child_token(&self, id: NodeId, kind: TokenKind) -> bool {
        self.child_token(id, kind).is_some()
    }

    fn index_in_parent(&self, element: Element) -> usize {
        match element {
            Element::Node(id) => self.node(id).index,
            Element::Token(id) => self.token(id).index,
        }
    }

    pub fn next_sibling(&self, element: Element) -> Option<Element> {
        let parent = self.parent(element)?;
        self.children(parent)
            .get(self.index_in_parent(element) + 1)
            .copied()
    }

    pub fn prev_sibling(&self, element: Element) -> Option<Element> {
        let parent = self.parent(element)?;
        let index = self.index_in_parent(element);
        if index == 0 {
            return None;
        }
        self.children(parent).get(index - 1).copied()
    }

    /// Next sibling that is not a trivia token.
    pub fn next_non_trivia_sibling(&self, element: Element) -> Option<Element> {
        let mut current = self.next_sibling(element);
        while let Some(sibling) = current {
            if !self.is_trivia(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// Previous sibling that is not a trivia token.
    pub fn prev_non_trivia_sibling(&self, element: Element) -> Option<Element> {
        let mut current = self.prev_sibling(element);
        while let Some(sibling) = current {
            if !self.is_trivia(sibling) {
                return Some(sibling);
            }
            current = self.prev_sibling(sibling);
        }
        None
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |node| self.node_parent(*node))
    }

    /// Ancestors of a token, starting at its parent.
    pub fn token_ancestors(&self, id: TokenId) -> impl Iterator<Item = NodeId> + '_ {
        self.ancestors(self.token_parent(id))
    }

    /// Ancestors of an element, starting at its parent.
    pub fn element_ancestors(&self, element: Element) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(element), move |node| self.node_parent(*node))
    }

    /// The ancestor `level` steps above `element` (1 is the parent).
    pub fn super_parent(&self, element: Element, level: usize) -> Option<NodeId> {
        if level == 0 {
            return None;
        }
        self.element_ancestors(element).nth(level - 1)
    }

    /// First ancestor of `element` (exclusive) with the given kind.
    pub fn enclosing(&self, element: Element, kind: NodeKind) -> Option<NodeId> {
        self.element_ancestors(element)
            .find(|node| self.node_kind(*node) == kind)
    }

    /// All tokens below `id`, in document order.
    pub fn descendant_tokens(&self, id: NodeId) -> impl Iterator<Item = TokenId> + '_ {
        let mut stack: Vec<Element> = self.children(id).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            while let Some(element) = stack.pop() {
                match element {
                    Element::Token(token) => return Some(token),
                    Element::Node(node) => stack.extend(self.children(node).iter().rev()),
                }
            }
            None
        })
    }

    /// First non-trivia token below `id`.
    pub fn first_significant_token(&self, id: NodeId) -> Option<TokenId> {
        self.descendant_tokens(id)
            .find(|token| !self.token_kind(*token).is_trivia())
    }

    // ------------------------------------------------------------------
    // Leaf navigation
    // ------------------------------------------------------------------

    /// Token in document order before `id`.
    pub fn prev_token(&self, id: TokenId) -> Option<TokenId> {
        id.0.checked_sub(1).map(TokenId)
    }

    /// Token in document order after `id`.
    pub fn next_token(&self, id: TokenId) -> Option<TokenId> {
        let next = id.0 as usize + 1;
        (next < self.tokens.len()).then_some(TokenId(next as u32))
    }

    /// Nearest non-trivia, non-empty token before `id`.
    pub fn prev_significant_token(&self, id: TokenId) -> Option<TokenId> {
        let mut current = self.prev_token(id);
        while let Some(token) = current {
            if !self.token_kind(token).is_trivia() && !self.token_range(token).is_empty() {
                return Some(token);
            }
            current = self.prev_token(token);
        }
        None
    }

    /// Token whose range contains `offset` (`start <= offset < end`).
    pub fn token_at_offset(&self, offset: usize) -> Option<TokenId> {
        let index = self
            .tokens
            .partition_point(|token| token.range.start <= offset);
        // Several empty tokens may share a start; the last one with
        // `start <= offset` is the only candidate with a non-empty range.
        let candidate = index.checked_sub(1)?;
        self.tokens[candidate]
            .range
            .contains(offset)
            .then_some(TokenId(candidate as u32))
    }

    /// Token whose range ends exactly at `offset`.
    pub fn token_ending_at(&self, offset: usize) -> Option<TokenId> {
        let index = self.tokens.partition_point(|token| token.range.end < offset);
        self.tokens
            .get(index)
            .filter(|token| token.range.end == offset && !token.range.is_empty())
            .map(|_| TokenId(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TreeBuilder;

    // \func f => x
    fn sample() -> SyntaxTree {
        let mut builder = TreeBuilder::new();
        builder.node(NodeKind::File, |b| {
            b.node(NodeKind::Statement, |b| {
                b.node(NodeKind::DefFunction, |b| {
                    b.token(TokenKind::FunctionKw, "\\func")
                        .token(TokenKind::Whitespace, " ")
                        .node(NodeKind::DefIdentifier, |b| {
                            b.token(TokenKind::Id, "f");
                        })
                        .token(TokenKind::Whitespace, " ")
                        .node(NodeKind::FunctionBody, |b| {
                            b.token(TokenKind::FatArrow, "=>")
                                .token(TokenKind::Whitespace, " ")
                                .token(TokenKind::Id, "x");
                        });
                });
            });
        });
        builder.finish().unwrap()
    }

    #[test]
    fn test_ranges_cover_text() {
        let tree = sample();
        assert_eq!(tree.text(), "\\func f => x");
        assert_eq!(tree.node_range(tree.root()), TextRange::new(0, 12));
        let rebuilt: String = tree
            .descendant_tokens(tree.root())
            .map(|t| tree.token_text(t))
            .collect();
        assert_eq!(rebuilt, tree.text());
    }

    #[test]
    fn test_token_at_offset_and_ending_at() {
        let tree = sample();
        let func = tree.token_at_offset(0).unwrap();
        assert_eq!(tree.token_kind(func), TokenKind::FunctionKw);
        let f = tree.token_at_offset(6).unwrap();
        assert_eq!(tree.token_text(f), "f");
        assert_eq!(tree.token_ending_at(7), Some(f));
        assert_eq!(tree.token_at_offset(12), None);
        assert_eq!(tree.token_ending_at(3), None);
    }

    #[test]
    fn test_ancestors_and_super_parent() {
        let tree = sample();
        let f = tree.token_at_offset(6).unwrap();
        let kinds: Vec<NodeKind> = tree
            .token_ancestors(f)
            .map(|n| tree.node_kind(n))
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::DefIdentifier,
                NodeKind::DefFunction,
                NodeKind::Statement,
                NodeKind::File
            ]
        );
        let element = Element::Token(f);
        assert_eq!(
            tree.super_parent(element, 2).map(|n| tree.node_kind(n)),
            Some(NodeKind::DefFunction)
        );
        assert_eq!(tree.super_parent(element, 5), None);
        assert_eq!(tree.super_parent(element, 0), None);
    }

    #[test]
    fn test_sibling_navigation_skips_trivia() {
        let tree = sample();
        let func = tree.token_at_offset(0).unwrap();
        let next = tree.next_non_trivia_sibling(Element::Token(func)).unwrap();
        assert_eq!(tree.element_node_kind(next), Some(NodeKind::DefIdentifier));
        assert_eq!(
            tree.prev_non_trivia_sibling(next),
            Some(Element::Token(func))
        );
        assert!(tree.next_sibling(Element::Node(tree.root())).is_none());
    }

    #[test]
    fn test_prev_significant_token() {
        let tree = sample();
        let x = tree.token_at_offset(11).unwrap();
        let arrow = tree.prev_significant_token(x).unwrap();
        assert_eq!(tree.token_kind(arrow), TokenKind::FatArrow);
        assert_eq!(tree.prev_significant_token(TokenId(0)), None);
    }

    #[test]
    fn test_child_lookup() {
        let tree = sample();
        let def = tree
            .ancestors(tree.root())
            .next()
            .and_then(|root| tree.child_node(root, NodeKind::Statement))
            .and_then(|stmt| tree.child_node(stmt, NodeKind::DefFunction))
            .unwrap();
        assert!(tree.has_child_token(def, TokenKind::FunctionKw));
        assert!(!tree.has_child_token(def, TokenKind::WhereKw));
        let body = tree.child_node(def, NodeKind::FunctionBody).unwrap();
        assert!(tree.has_child_token(body, TokenKind::FatArrow));
        assert_eq!(tree.node_text(body), "=> x");
    }
}
