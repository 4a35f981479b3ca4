// cli/complete.rs — `arend-completion complete` subcommand
//
// Loads a syntax tree snapshot, runs keyword completion at an offset and
// prints the candidates, either as a table or as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::{load_config, CompletionConfig};
use crate::engine::CompletionEngine;
use crate::insertion::{Candidate, Insertion};
use crate::position::PLACEHOLDER_IDENTIFIER;
use crate::syntax::{SyntaxTree, TreeSnapshot};

/// Parsed arguments for the `complete` subcommand.
#[derive(Debug, PartialEq)]
pub struct CompleteArgs {
    pub snapshot: PathBuf,
    /// Cursor offset in bytes. Defaults to the placeholder identifier.
    pub offset: Option<usize>,
    pub prefix: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Parse `complete` arguments from the remaining CLI args.
///
/// Expected usage:
/// `arend-completion complete <snapshot.json> [--offset N] [--prefix P] [--config settings.json] [--json]`
pub fn parse_args(args: &mut impl Iterator<Item = String>) -> Result<CompleteArgs, String> {
    let mut snapshot: Option<PathBuf> = None;
    let mut offset = None;
    let mut prefix = None;
    let mut config = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--offset" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--offset requires a byte offset".to_string())?;
                let value = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid offset '{}'", value))?;
                offset = Some(value);
            }
            "--prefix" => {
                prefix = Some(
                    args.next()
                        .ok_or_else(|| "--prefix requires a value".to_string())?,
                );
            }
            "--config" => {
                config = Some(PathBuf::from(
                    args.next()
                        .ok_or_else(|| "--config requires a settings file".to_string())?,
                ));
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown flag: '{}'", other));
            }
            _ => {
                if snapshot.is_some() {
                    return Err("Multiple snapshots provided; expected exactly one".to_string());
                }
                snapshot = Some(PathBuf::from(arg));
            }
        }
    }

    let snapshot = snapshot.ok_or_else(|| "Missing required <snapshot.json> argument".to_string())?;

    Ok(CompleteArgs {
        snapshot,
        offset,
        prefix,
        config,
        json,
    })
}

/// Load the snapshot named by `args` into a tree.
pub fn load_tree(args: &CompleteArgs) -> Result<SyntaxTree> {
    let json = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read snapshot {}", args.snapshot.display()))?;
    TreeSnapshot::from_json(&json)?
        .into_tree()
        .with_context(|| format!("snapshot {} does not form a tree", args.snapshot.display()))
}

/// Cursor offset: the explicit one, else where the placeholder starts.
pub fn resolve_offset(args: &CompleteArgs, tree: &SyntaxTree) -> Result<usize> {
    match args.offset {
        Some(offset) => Ok(offset),
        None => tree.text().find(PLACEHOLDER_IDENTIFIER).with_context(|| {
            format!(
                "no --offset given and the snapshot contains no {}",
                PLACEHOLDER_IDENTIFIER
            )
        }),
    }
}

/// Run the complete command and return the candidates with the tree they
/// refer to.
pub fn run_complete(args: &CompleteArgs) -> Result<(SyntaxTree, Vec<Candidate>)> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CompletionConfig::default(),
    };
    let tree = load_tree(args)?;
    let offset = resolve_offset(args, &tree)?;
    log::debug!(
        "completing {} at offset {} ({} tokens)",
        args.snapshot.display(),
        offset,
        tree.token_count()
    );

    let engine = CompletionEngine::new(config);
    let candidates = engine.complete(&tree, offset, args.prefix.as_deref());
    Ok((tree, candidates))
}

/// Print candidates in human-readable format.
pub fn print_results(candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("no keyword candidates");
        return;
    }
    for candidate in candidates {
        println!(
            "  {:<20} {:>6.1}   {:<28} ({:?})",
            candidate.display_text,
            candidate.priority,
            candidate.rule,
            candidate.insertion().text
        );
    }
}

#[derive(Serialize)]
struct CandidateOutput<'a> {
    #[serde(flatten)]
    candidate: &'a Candidate,
    insertion: Insertion,
}

/// Print candidates as a JSON array.
pub fn print_results_json(candidates: &[Candidate]) -> Result<()> {
    let output: Vec<CandidateOutput<'_>> = candidates
        .iter()
        .map(|candidate| CandidateOutput {
            candidate,
            insertion: candidate.insertion(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CompleteArgs, String> {
        parse_args(&mut list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_full() {
        let parsed = args(&[
            "tree.json", "--offset", "12", "--prefix", "\\ca", "--config", "s.json", "--json",
        ])
        .unwrap();
        assert_eq!(
            parsed,
            CompleteArgs {
                snapshot: PathBuf::from("tree.json"),
                offset: Some(12),
                prefix: Some("\\ca".to_string()),
                config: Some(PathBuf::from("s.json")),
                json: true,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&[]).unwrap_err().contains("Missing required"));
        assert!(args(&["a.json", "b.json"]).unwrap_err().contains("Multiple"));
        assert!(args(&["a.json", "--offset"]).unwrap_err().contains("requires"));
        assert!(args(&["a.json", "--offset", "x"]).unwrap_err().contains("Invalid offset"));
        assert!(args(&["a.json", "--csv"]).unwrap_err().contains("Unknown flag"));
    }

    #[test]
    fn test_missing_snapshot_file() {
        let parsed = args(&["/nonexistent/tree.json"]).unwrap();
        let err = run_complete(&parsed).unwrap_err();
        assert!(err.to_string().contains("failed to read snapshot"));
    }
}
