//! Expansion of include directives against the resolved document corpus.
//!
//! Results always follow corpus order, never pattern order. [`expand_all`]
//! processes directives in sequence and keeps the first occurrence of every
//! document, so authors control final ordering by the order of their
//! directives.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::IncludeError;
use crate::registry::DocInfo;

/// A pattern selecting documents by logical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IncludeDirective {
    /// Exactly the document at `pattern`.
    Exact { pattern: String },
    /// Direct children of the prefix only (`learn/*` matches `learn/x`, not `learn/sub/y`).
    Glob { pattern: String },
    /// Every document under the prefix at any depth, including the prefix's own document.
    Wildcard { pattern: String },
}

impl IncludeDirective {
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self::Exact {
            pattern: pattern.into(),
        }
    }

    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob {
            pattern: pattern.into(),
        }
    }

    pub fn wildcard(pattern: impl Into<String>) -> Self {
        Self::Wildcard {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            Self::Exact { pattern } | Self::Glob { pattern } | Self::Wildcard { pattern } => {
                pattern
            }
        }
    }

    /// Whether the document at `path` is selected by this directive.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact { pattern } => path == pattern,
            Self::Glob { pattern } => {
                let base = strip_markers(pattern);
                match child_remainder(path, base) {
                    Some(rest) => !rest.is_empty() && !rest.contains('/'),
                    None => false,
                }
            }
            Self::Wildcard { pattern } => {
                let base = strip_markers(pattern);
                path == base || child_remainder(path, base).is_some_and(|rest| !rest.is_empty())
            }
        }
    }
}

/// `mirascope/learn/*` → `mirascope/learn`; `*` → ``.
fn strip_markers(pattern: &str) -> &str {
    pattern.trim_end_matches('*').trim_end_matches('/')
}

/// The part of `path` below `base`, if `path` lies under it.
fn child_remainder<'a>(path: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return Some(path);
    }
    path.strip_prefix(base)?.strip_prefix('/')
}

/// Documents matched by one directive, in corpus order.
///
/// An exact directive without a match returns an empty list; deciding whether
/// that is fatal is left to [`resolve_includes`].
pub fn expand<'a>(directive: &IncludeDirective, corpus: &'a [DocInfo]) -> Vec<&'a DocInfo> {
    let matched: Vec<&DocInfo> = corpus
        .iter()
        .filter(|doc| directive.matches(&doc.path))
        .collect();
    debug!(
        pattern = directive.pattern(),
        matched = matched.len(),
        "Expanded include directive"
    );
    matched
}

/// Expand directives in order, dropping documents already claimed by an earlier directive.
pub fn expand_all<'a>(directives: &[IncludeDirective], corpus: &'a [DocInfo]) -> Vec<&'a DocInfo> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for directive in directives {
        for doc in expand(directive, corpus) {
            if seen.insert(doc.path.as_str()) {
                result.push(doc);
            }
        }
    }
    result
}

/// [`expand_all`] with the include policy applied: an exact directive that
/// matches nothing is an error naming the pattern, while an empty glob or
/// wildcard is only logged.
pub fn resolve_includes<'a>(
    directives: &[IncludeDirective],
    corpus: &'a [DocInfo],
) -> Result<Vec<&'a DocInfo>, IncludeError> {
    for directive in directives {
        let found = corpus.iter().any(|doc| directive.matches(&doc.path));
        match directive {
            IncludeDirective::Exact { pattern } if !found => {
                return Err(IncludeError::MissingExact {
                    pattern: pattern.clone(),
                });
            }
            IncludeDirective::Glob { pattern } | IncludeDirective::Wildcard { pattern }
                if !found =>
            {
                warn!(pattern = %pattern, "Include pattern matched no documents");
            }
            _ => {}
        }
    }
    Ok(expand_all(directives, corpus))
}
