//! Token counting with a subword tokenizer and a deterministic fallback.
//!
//! Counting never fails: if the tokenizer cannot be loaded or errors on some
//! input, [`approximate_token_count`] is used instead. The fallback is logged
//! once per [`TokenCounter`], not once per document.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use thiserror::Error;
use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tokenizer failed: {0}")]
pub struct TokenizerError(pub String);

/// A subword tokenizer. Implemented by [`TiktokenTokenizer`] and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Tokenizer: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> Result<usize, TokenizerError>;
}

/// The `cl100k_base` BPE encoding.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    pub fn new() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TokenizerError(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }
}

/// `ceil(characters / 4)`.
///
/// ```
/// use docs_bundle_core::tokens::approximate_token_count;
///
/// assert_eq!(approximate_token_count(""), 0);
/// assert_eq!(approximate_token_count("abcd"), 1);
/// assert_eq!(approximate_token_count("abcde"), 2);
/// ```
pub fn approximate_token_count(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Counts tokens for content nodes.
pub struct TokenCounter {
    tokenizer: Option<Arc<dyn Tokenizer>>,
    fallback_logged: AtomicBool,
}

impl TokenCounter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer: Some(tokenizer),
            fallback_logged: AtomicBool::new(false),
        }
    }

    /// A counter that only uses the character approximation. Nothing is logged.
    pub fn approximate() -> Self {
        Self {
            tokenizer: None,
            fallback_logged: AtomicBool::new(true),
        }
    }

    /// Load the `cl100k_base` tokenizer, falling back to the approximation if it is unavailable.
    pub fn tiktoken() -> Self {
        match TiktokenTokenizer::new() {
            Ok(tokenizer) => {
                debug!("Loaded cl100k_base tokenizer");
                Self::new(Arc::new(tokenizer))
            }
            Err(e) => {
                warn!(error = %e, "Tokenizer unavailable; using character-based token estimate");
                Self::approximate()
            }
        }
    }

    /// True when no tokenizer is configured.
    pub fn is_approximate(&self) -> bool {
        self.tokenizer.is_none()
    }

    pub fn count(&self, text: &str) -> usize {
        let Some(tokenizer) = &self.tokenizer else {
            return approximate_token_count(text);
        };
        match tokenizer.count(text) {
            Ok(count) => count,
            Err(e) => {
                if !self.fallback_logged.swap(true, Ordering::Relaxed) {
                    warn!(error = %e, "Tokenizer failed; using character-based token estimate");
                }
                approximate_token_count(text)
            }
        }
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::tiktoken()
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("approximate", &self.is_approximate())
            .finish()
    }
}
