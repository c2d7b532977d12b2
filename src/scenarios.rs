use crate::config::ScenarioDefaults;
use crate::error::{Error, Result};
use crate::results::ValidatedPair;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Key of the scenario collection in the configuration document
pub const SCENARIOS_KEY: &str = "scenarios";

/// One visual test scenario as understood by the screenshot-diff tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub label: String,

    /// Page under test
    pub url: String,

    /// Page the screenshot is compared against
    pub reference_url: String,

    pub hide_selectors: Vec<String>,
    pub remove_selectors: Vec<String>,
    pub mis_match_threshold: f64,
}

impl ScenarioRecord {
    /// Builds the record for the `index`-th (1-based) pair added in this run
    pub fn from_pair(index: usize, pair: &ValidatedPair, defaults: &ScenarioDefaults) -> Self {
        Self {
            label: format!("Additional test page ({})", index),
            url: pair.after().to_string(),
            reference_url: pair.before().to_string(),
            hide_selectors: defaults.hide_selectors.clone(),
            remove_selectors: defaults.remove_selectors.clone(),
            mis_match_threshold: defaults.mis_match_threshold,
        }
    }
}

/// Reads and parses a whole JSON document.
///
/// A missing file is reported as [`Error::ConfigMissing`].
pub fn read_document(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::ConfigMissing(path.to_path_buf()),
        _ => Error::io(path, e),
    })?;

    serde_json::from_str(&contents).map_err(|e| Error::json(path, e))
}

/// Overwrites `path` with `document`, pretty-printed with 2-space indentation
pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let contents = serde_json::to_string_pretty(document).map_err(|e| Error::json(path, e))?;
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}

/// Returns the scenario collection of `document`, creating it when absent
pub fn scenarios_mut<'a>(document: &'a mut Value, path: &Path) -> Result<&'a mut Vec<Value>> {
    let Some(object) = document.as_object_mut() else {
        return Err(Error::InvalidDocument {
            path: path.to_path_buf(),
            reason: "top level is not a JSON object".to_string(),
        });
    };

    let scenarios = object
        .entry(SCENARIOS_KEY)
        .or_insert_with(|| Value::Array(Vec::new()));
    if scenarios.is_null() {
        *scenarios = Value::Array(Vec::new());
    }

    match scenarios {
        Value::Array(items) => Ok(items),
        _ => Err(Error::InvalidDocument {
            path: path.to_path_buf(),
            reason: format!("\"{}\" is not an array", SCENARIOS_KEY),
        }),
    }
}

/// Appends one scenario per pair to an in-memory document, returning the count
pub fn append_to_document(
    document: &mut Value,
    path: &Path,
    pairs: &[ValidatedPair],
    defaults: &ScenarioDefaults,
) -> Result<usize> {
    let scenarios = scenarios_mut(document, path)?;

    for (i, pair) in pairs.iter().enumerate() {
        let record = ScenarioRecord::from_pair(i + 1, pair, defaults);
        ::log::info!("Adding scenario '{}': {}", record.label, record.url);
        let value = serde_json::to_value(&record).map_err(|e| Error::json(path, e))?;
        scenarios.push(value);
    }

    Ok(pairs.len())
}

/// Appends validated pairs as scenarios to the configuration document at `path`.
///
/// The whole document is read, patched in memory and written back. Every
/// other top-level field is kept as it was. Returns the number of scenarios
/// appended.
pub fn apply(path: &Path, pairs: &[ValidatedPair], defaults: &ScenarioDefaults) -> Result<usize> {
    let mut document = read_document(path)?;
    let appended = append_to_document(&mut document, path, pairs, defaults)?;
    write_document(path, &document)?;

    ::log::info!("Wrote {} new scenario(s) to {}", appended, path.display());
    Ok(appended)
}
