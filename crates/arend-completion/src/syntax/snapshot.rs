//
// syntax/snapshot.rs
//
// JSON form of a syntax tree, used to hand a parsed tree across a process
// boundary (the `complete` subcommand reads one from disk).
//

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::builder::TreeBuilder;
use super::kind::{NodeKind, TokenKind};
use super::tree::{Element, NodeId, SyntaxTree};

/// A node and its children, e.g.
///
/// ```json
/// {"kind": "Statement", "children": [{"kind": "OpenKw", "text": "\\open"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<SnapshotElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotElement {
    Token(SnapshotToken),
    Node(TreeSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotToken {
    pub kind: TokenKind,
    pub text: String,
}

impl TreeSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid syntax tree snapshot")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize syntax tree snapshot")
    }

    /// Captures `tree` as a snapshot.
    pub fn from_tree(tree: &SyntaxTree) -> Self {
        snapshot_node(tree, tree.root())
    }

    /// Replays the snapshot through a [`TreeBuilder`].
    pub fn into_tree(self) -> Result<SyntaxTree> {
        let mut builder = TreeBuilder::new();
        replay(&mut builder, self);
        builder.finish()
    }
}

fn snapshot_node(tree: &SyntaxTree, id: NodeId) -> TreeSnapshot {
    let children = tree
        .children(id)
        .iter()
        .map(|child| match *child {
            Element::Node(node) => SnapshotElement::Node(snapshot_node(tree, node)),
            Element::Token(token) => SnapshotElement::Token(SnapshotToken {
                kind: tree.token_kind(token),
                text: tree.token_text(token).to_string(),
            }),
        })
        .collect();
    TreeSnapshot {
        kind: tree.node_kind(id),
        children,
    }
}

fn replay(builder: &mut TreeBuilder, node: TreeSnapshot) {
    builder.start_node(node.kind);
    for child in node.children {
        match child {
            SnapshotElement::Node(child) => replay(builder, child),
            SnapshotElement::Token(token) => {
                builder.token(token.kind, &token.text);
            }
        }
    }
    builder.finish_node();
}
