//
// syntax/mod.rs
//
// Syntax tree model consumed by the completion engine. The tree comes from
// an error-recovering parser outside this crate; it is never mutated here.
//

mod builder;
mod kind;
pub mod snapshot;
mod tree;

pub use builder::TreeBuilder;
pub use kind::{NodeKind, TokenKind};
pub use snapshot::TreeSnapshot;
pub use tree::{Element, NodeId, SyntaxTree, TextRange, TokenId};
