// Lexical content filter for user submissions.
//
// Each deny-list term is compiled once into a whole-word pattern where the
// commonly substituted letters accept their leetspeak stand-ins. All patterns
// go into one `RegexSet`, so checking a text is a single pass.
//
// This is advisory filtering only. Novel spellings get through, and a
// legitimate word that equals a term under substitution is rejected.

use super::deny_list::DEFAULT_DENY_LIST;
use regex::{RegexSet, RegexSetBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Failed to compile deny-list patterns: {0}")]
    Compile(#[from] regex::Error),
}

/// Result of evaluating one batch of texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub contains_violation: bool,
}

impl ModerationVerdict {
    pub fn is_clean(&self) -> bool {
        !self.contains_violation
    }
}

/// Character classes accepted in place of a plain letter.
fn substitution_class(ch: char) -> Option<&'static str> {
    match ch {
        'a' => Some("[a@4]"),
        'e' => Some("[e3]"),
        'i' => Some("[i1!]"),
        'o' => Some("[o0]"),
        's' => Some("[s$5]"),
        't' => Some("[t7]"),
        'l' => Some("[l1]"),
        _ => None,
    }
}

/// Turn a plain term into a whole-word pattern, e.g. `"shit"` into
/// `\b[s$5]h[i1!][t7]\b`.
pub fn compile_term(term: &str) -> String {
    let mut pattern = String::from(r"\b");
    let mut buf = [0u8; 4];

    for ch in term.to_lowercase().chars() {
        match substitution_class(ch) {
            Some(class) => pattern.push_str(class),
            None => pattern.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
        }
    }

    pattern.push_str(r"\b");
    pattern
}

/// Compiled deny-list matcher. Cheap to share; holds no per-call state.
#[derive(Debug, Clone)]
pub struct WordFilter {
    patterns: RegexSet,
}

impl WordFilter {
    pub fn new<I, S>(terms: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled: Vec<String> = terms
            .into_iter()
            .map(|term| compile_term(term.as_ref()))
            .collect();

        let patterns = RegexSetBuilder::new(compiled)
            .case_insensitive(true)
            .build()?;

        Ok(Self { patterns })
    }

    /// Filter over the built-in deny-list.
    pub fn with_defaults() -> Result<Self, FilterError> {
        Self::new(DEFAULT_DENY_LIST)
    }

    /// Does this single text contain a deny-listed term?
    pub fn contains_violation(&self, text: &str) -> bool {
        self.patterns.is_match(text)
    }

    /// Evaluate a whole submission; any matching text flags the batch.
    pub fn evaluate<S: AsRef<str>>(&self, texts: &[S]) -> ModerationVerdict {
        ModerationVerdict {
            contains_violation: texts
                .iter()
                .any(|text| self.contains_violation(text.as_ref())),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
