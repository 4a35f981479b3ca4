//
// config.rs
//
// Configuration for keyword completion
//

use std::path::Path;

use anyhow::{Context, Result};

/// Keyword completion configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Priority given to every keyword candidate instead of the rule's own
    pub keyword_priority: Option<f64>,
    /// Whether prefix matching distinguishes ASCII case
    pub case_sensitive: bool,
    /// Whether the client accepts snippet insert text
    pub snippet_support: bool,
    /// Upper bound on returned candidates
    pub max_candidates: Option<usize>,
}

impl Default for CompletionConfig {
    /// Case-insensitive matching, plain-text insertion, no limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use arend_completion::CompletionConfig;
    ///
    /// let cfg = CompletionConfig::default();
    /// assert!(!cfg.case_sensitive);
    /// assert!(!cfg.snippet_support);
    /// assert_eq!(cfg.max_candidates, None);
    /// ```
    fn default() -> Self {
        Self {
            keyword_priority: None,
            case_sensitive: false,
            snippet_support: false,
            max_candidates: None,
        }
    }
}

/// Parse the `completion` section of a settings object.
///
/// Returns `None` when the section is absent. Unknown keys and values of the
/// wrong type are ignored and keep their defaults.
pub fn parse_completion_config(settings: &serde_json::Value) -> Option<CompletionConfig> {
    let completion = settings.get("completion")?;

    let mut config = CompletionConfig::default();

    if let Some(v) = completion.get("keywordPriority").and_then(|v| v.as_f64()) {
        config.keyword_priority = Some(v);
    }
    if let Some(v) = completion.get("caseSensitive").and_then(|v| v.as_bool()) {
        config.case_sensitive = v;
    }
    if let Some(v) = completion.get("snippetSupport").and_then(|v| v.as_bool()) {
        config.snippet_support = v;
    }
    if let Some(v) = completion.get("maxCandidates").and_then(|v| v.as_u64()) {
        config.max_candidates = Some(v as usize);
    }

    log::trace!("parsed completion config: {:?}", config);
    Some(config)
}

/// Load configuration from a JSON settings file.
///
/// A file without a `completion` section yields the defaults.
pub fn load_config(path: &Path) -> Result<CompletionConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("settings file {} is not valid JSON", path.display()))?;
    Ok(parse_completion_config(&settings).unwrap_or_default())
}
