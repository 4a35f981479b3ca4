// lib.rs — Keyword completion for the Arend language.
//
// The engine works on an immutable syntax tree handed over by a parser
// (see `syntax`). `engine` runs the rule table in `rules`, whose contexts
// and guards live in `contexts`. The binary in main.rs and the benches
// drive the same API.

pub mod cli;
pub mod config;
pub mod contexts;
pub mod engine;
pub mod insertion;
pub mod keywords;
pub mod lsp;
pub mod pattern;
pub mod perf;
pub mod position;
pub mod prefix;
pub mod rules;
pub mod syntax;

pub use config::CompletionConfig;
pub use engine::{Cancellation, CompletionEngine, CompletionRequest};
pub use insertion::{Candidate, InsertAction, Insertion};
