//
// syntax/builder.rs
//
// Event-style builder the external parser drives to hand over a tree.
//

use anyhow::{anyhow, bail, Result};

use super::kind::{NodeKind, TokenKind};
use super::tree::{Element, NodeData, NodeId, SyntaxTree, TextRange, TokenData, TokenId};

/// Builds a [`SyntaxTree`] from `start_node` / `token` / `finish_node` calls.
///
/// Calls chain, so a parser (or a test) can describe a tree inline:
///
/// ```
/// use arend_completion::syntax::{NodeKind, TokenKind, TreeBuilder};
///
/// let mut builder = TreeBuilder::new();
/// builder
///     .start_node(NodeKind::File)
///     .token(TokenKind::Whitespace, "\n")
///     .finish_node();
/// let tree = builder.finish().unwrap();
/// assert_eq!(tree.text(), "\n");
/// ```
///
/// Misuse (a token outside any node, unbalanced finishes, a second root)
/// is recorded and reported by [`TreeBuilder::finish`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    text: String,
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
    stack: Vec<NodeId>,
    error: Option<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_error(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    pub fn start_node(&mut self, kind: NodeKind) -> &mut Self {
        let parent = self.stack.last().copied();
        if parent.is_none() && !self.nodes.is_empty() {
            self.record_error(format!("second root node {:?}", kind));
            return self;
        }

        let id = NodeId(self.nodes.len() as u32);
        let index = match parent {
            Some(parent) => {
                let children = &mut self.nodes[parent.0 as usize].children;
                children.push(Element::Node(id));
                children.len() - 1
            }
            None => 0,
        };
        let offset = self.text.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            index,
            children: Vec::new(),
            range: TextRange::new(offset, offset),
        });
        self.stack.push(id);
        self
    }

    pub fn token(&mut self, kind: TokenKind, text: &str) -> &mut Self {
        let Some(&parent) = self.stack.last() else {
            self.record_error(format!("token {:?} outside of any node", kind));
            return self;
        };

        let id = TokenId(self.tokens.len() as u32);
        let children = &mut self.nodes[parent.0 as usize].children;
        children.push(Element::Token(id));
        let index = children.len() - 1;

        let start = self.text.len();
        self.text.push_str(text);
        self.tokens.push(TokenData {
            kind,
            parent,
            index,
            range: TextRange::new(start, self.text.len()),
        });
        self
    }

    pub fn finish_node(&mut self) -> &mut Self {
        match self.stack.pop() {
            Some(id) => self.nodes[id.0 as usize].range.end = self.text.len(),
            None => self.record_error("finish_node without a matching start_node".to_string()),
        }
        self
    }

    /// `start_node(kind)`, then `body`, then `finish_node()`.
    pub fn node(&mut self, kind: NodeKind, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.start_node(kind);
        body(self);
        self.finish_node()
    }

    pub fn finish(self) -> Result<SyntaxTree> {
        if let Some(error) = self.error {
            bail!("malformed tree: {}", error);
        }
        if let Some(open) = self.stack.last() {
            let kind = self.nodes[open.0 as usize].kind;
            bail!("malformed tree: node {:?} was never finished", kind);
        }
        if self.nodes.is_empty() {
            return Err(anyhow!("malformed tree: no root node"));
        }
        Ok(SyntaxTree {
            text: self.text,
            nodes: self.nodes,
            tokens: self.tokens,
        })
    }
}
