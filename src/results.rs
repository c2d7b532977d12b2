/// A before/after URL pair extracted from free text, not yet checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    /// Reference URL (the "Before:" line)
    pub before: String,

    /// URL under test (the "After:" line)
    pub after: String,
}

impl CandidatePair {
    /// Create a new candidate pair
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// A candidate pair whose both sides answered HTTP 200.
///
/// Only the validator can produce one, so holding a `ValidatedPair` is proof
/// that both URLs were reachable when checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPair {
    before: String,
    after: String,
}

impl ValidatedPair {
    pub(crate) fn from_candidate(pair: CandidatePair) -> Self {
        Self {
            before: pair.before,
            after: pair.after,
        }
    }

    pub fn before(&self) -> &str {
        &self.before
    }

    pub fn after(&self) -> &str {
        &self.after
    }
}

/// What an end-to-end pipeline invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No text was supplied, nothing was read or written
    NoText,

    /// Text was scanned but no pair survived extraction and validation
    NoPairs {
        /// Number of candidate pairs found before validation
        extracted: usize,
    },

    /// Validated pairs were appended to the configuration document
    Applied {
        extracted: usize,
        appended: usize,
    },
}

impl Outcome {
    /// Number of scenarios written by this invocation
    pub fn appended(&self) -> usize {
        match self {
            Outcome::Applied { appended, .. } => *appended,
            _ => 0,
        }
    }
}
