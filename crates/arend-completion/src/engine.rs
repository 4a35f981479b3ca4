//
// engine.rs
//
// Keyword completion engine: resolves the position, runs the rule table in
// registration order and collects deduplicated, ordered candidates.
//

use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::config::CompletionConfig;
use crate::insertion::Candidate;
use crate::pattern::Pattern;
use crate::perf::{self, RequestTimer};
use crate::position::{self, PositionContext};
use crate::prefix::{self, PrefixMatcher};
use crate::rules::{CandidateRule, RULES};
use crate::syntax::{SyntaxTree, TextRange, TokenId, TokenKind};

/// Completion requests slower than this are reported in verbose perf mode.
const COMPLETION_WARN_MS: u64 = 20;

/// Cooperative cancellation, polled once before each rule.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

/// Never cancelled.
impl Cancellation for () {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl Cancellation for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl<T: Cancellation + ?Sized> Cancellation for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// One evaluation: the tree, the cursor and what the rules see of it.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub tree: &'a SyntaxTree,
    pub offset: usize,
    pub context: PositionContext,
    /// Prefix after escape-marker recovery, see [`prefix::compute_prefix`].
    pub prefix: String,
}

impl<'a> CompletionRequest<'a> {
    /// Build a request, or `None` when the tree has no completion position
    /// at `offset`.
    ///
    /// Without an explicit `raw_prefix`, the whitespace-delimited word
    /// before the cursor is used.
    pub fn new(tree: &'a SyntaxTree, offset: usize, raw_prefix: Option<&str>) -> Option<Self> {
        let before = tree.text().get(..offset)?;
        let context = position::resolve(tree, offset)?;
        let raw = match raw_prefix {
            Some(raw) => raw,
            None => {
                let start = before
                    .rfind(char::is_whitespace)
                    .map_or(0, |i| i + before[i..].chars().next().map_or(1, char::len_utf8));
                &before[start..]
            }
        };
        let prefix = prefix::compute_prefix(tree.text(), offset, raw);
        Some(Self {
            tree,
            offset,
            context,
            prefix,
        })
    }

    pub fn position(&self) -> TokenId {
        self.context.position
    }

    pub fn prev(&self) -> Option<TokenId> {
        self.context.prev_token
    }

    pub fn next(&self) -> Option<TokenId> {
        self.context.next_token
    }
}

/// Whether the cursor sits where no keyword can be typed: inside a comment
/// or string literal, or at the end of a line comment.
fn inside_comment_or_string(tree: &SyntaxTree, offset: usize) -> bool {
    let covering = tree.token_at_offset(offset).is_some_and(|token| {
        let kind = tree.token_kind(token);
        (kind.is_comment() || kind == TokenKind::String)
            && tree.token_range(token).strictly_contains(offset)
    });
    covering
        || tree
            .token_ending_at(offset)
            .is_some_and(|token| tree.token_kind(token) == TokenKind::LineComment)
}

/// Runs the rule table against a tree.
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    rules: &'static [CandidateRule],
    config: CompletionConfig,
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new(CompletionConfig::default())
    }
}

impl CompletionEngine {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            rules: RULES,
            config,
        }
    }

    /// Use a different rule table. Mostly useful in tests.
    pub fn with_rules(mut self, rules: &'static [CandidateRule]) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Keyword candidates at `offset`, best first.
    pub fn complete(
        &self,
        tree: &SyntaxTree,
        offset: usize,
        raw_prefix: Option<&str>,
    ) -> Vec<Candidate> {
        self.complete_with_cancellation(tree, offset, raw_prefix, &())
    }

    /// Like [`CompletionEngine::complete`], but gives up with an empty list
    /// as soon as `cancel` reports cancellation.
    pub fn complete_with_cancellation(
        &self,
        tree: &SyntaxTree,
        offset: usize,
        raw_prefix: Option<&str>,
        cancel: &impl Cancellation,
    ) -> Vec<Candidate> {
        let timer = RequestTimer::start("keyword_completion", COMPLETION_WARN_MS);

        if offset > tree.text().len() {
            log::warn!(
                "completion offset {} is past the end of the document ({} bytes)",
                offset,
                tree.text().len()
            );
            return Vec::new();
        }
        if inside_comment_or_string(tree, offset) {
            log::debug!("no keyword completion inside comment or string at {}", offset);
            return Vec::new();
        }
        let Some(request) = CompletionRequest::new(tree, offset, raw_prefix) else {
            log::debug!("no completion position at offset {}", offset);
            return Vec::new();
        };
        let candidates = self.evaluate(&request, cancel);
        perf::record_duration(timer.finish());
        candidates
    }

    /// Evaluate every rule against a resolved request.
    pub fn evaluate(
        &self,
        request: &CompletionRequest<'_>,
        cancel: &impl Cancellation,
    ) -> Vec<Candidate> {
        let tree = request.tree;
        if Pattern::AfterLeaf(TokenKind::Dot).matches(tree, request.position()) {
            log::debug!("no keyword completion after '.'");
            return Vec::new();
        }

        let mut candidates: IndexMap<&'static str, Candidate> = IndexMap::new();
        for rule in self.rules {
            if cancel.is_cancelled() {
                log::debug!("keyword completion cancelled at rule {}", rule.name);
                perf::record_cancelled();
                return Vec::new();
            }
            if !rule.applies(request) {
                continue;
            }

            let rule_prefix = rule.prefix_for(&request.prefix);
            let matcher = PrefixMatcher::new(rule_prefix, self.config.case_sensitive);
            let replace = TextRange::new(
                request.offset.saturating_sub(matcher.prefix().len()),
                request.offset,
            );
            let priority = self.config.keyword_priority.unwrap_or(rule.priority);

            let mut added = 0;
            for &keyword in rule.keywords {
                if !matcher.matches(keyword) {
                    continue;
                }
                candidates.entry(keyword).or_insert_with(|| {
                    added += 1;
                    Candidate {
                        keyword,
                        display_text: rule.display.unwrap_or(keyword),
                        priority,
                        action: rule.action,
                        rule: rule.name,
                        replace,
                    }
                });
            }
            log::trace!(
                "rule {} fired with prefix {:?}: {} new candidate(s)",
                rule.name,
                matcher.prefix(),
                added
            );
        }

        let mut candidates: Vec<Candidate> = candidates.into_values().collect();
        // Stable, so equal priorities keep registration order.
        candidates.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(max) = self.config.max_candidates {
            candidates.truncate(max);
        }

        log::debug!(
            "keyword completion at {} (prefix {:?}): {} candidate(s)",
            request.offset,
            request.prefix,
            candidates.len()
        );
        perf::record_request(candidates.len());
        candidates
    }
}
