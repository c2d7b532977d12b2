use crate::parsers::Marker;
use crate::results::CandidatePair;

/// Scanner state threaded through the lines of a text.
///
/// Holds at most one pending value per side. A pair is emitted as soon as an
/// `After:` value arrives while a `Before:` value is pending, and emission
/// clears both slots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanState {
    pending_before: Option<String>,
    pending_after: Option<String>,
    pairs: Vec<CandidatePair>,
}

impl ScanState {
    /// Advances the scanner by one line
    pub fn step(mut self, line: &str) -> Self {
        match Marker::classify(line.trim()) {
            Some((Marker::Before, value)) => {
                // A later Before: silently replaces an unconsumed one
                self.pending_before = Some(value.to_string());
            }
            Some((Marker::After, value)) => match self.pending_before.take() {
                Some(before) => {
                    let after = value.to_string();
                    ::log::debug!("Found pair: {} -> {}", before, after);
                    self.pending_after = None;
                    self.pairs.push(CandidatePair { before, after });
                }
                None => self.pending_after = Some(value.to_string()),
            },
            None => {}
        }
        self
    }

    /// Pending Before: value, if any
    pub fn pending_before(&self) -> Option<&str> {
        self.pending_before.as_deref()
    }

    /// Pending After: value, if any
    pub fn pending_after(&self) -> Option<&str> {
        self.pending_after.as_deref()
    }

    /// Pairs emitted so far
    pub fn pairs(&self) -> &[CandidatePair] {
        &self.pairs
    }

    /// Ends the scan, warning about and dropping any unmatched value
    pub fn finish(self) -> Vec<CandidatePair> {
        if let Some(before) = &self.pending_before {
            ::log::warn!("Ignoring Before: {} with no matching After:", before);
        }
        if let Some(after) = &self.pending_after {
            ::log::warn!("Ignoring After: {} with no matching Before:", after);
        }
        self.pairs
    }
}

/// Extracts before/after URL pairs from free text in order of appearance
pub fn extract(text: &str) -> Vec<CandidatePair> {
    let pairs = text
        .lines()
        .fold(ScanState::default(), ScanState::step)
        .finish();

    ::log::info!("Extracted {} candidate pair(s)", pairs.len());
    pairs
}

/// Like [`extract`], but treats absent text as empty
pub fn extract_opt(text: Option<&str>) -> Vec<CandidatePair> {
    match text {
        Some(text) => extract(text),
        None => Vec::new(),
    }
}
