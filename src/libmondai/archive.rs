use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::libmondai::question::QuestionRecord;
use crate::libmondai::Error;

/// The persisted shape, kept compatible with the historical JSON format.
#[derive(Debug, Serialize)]
struct PersistedState<'a> {
    questions: &'a [QuestionRecord],
    #[serde(rename = "currentQuestion")]
    current_question: usize,
}

/// Serializes the full editor state for the storage blob.
pub fn to_persistable(records: &[QuestionRecord], cursor: usize) -> Result<String, Error> {
    let state = PersistedState {
        questions: records,
        current_question: cursor,
    };
    Ok(serde_json::to_string(&state)?)
}

/// Reads back a storage blob. A missing or non-list `questions` entry
/// yields an empty list (the store re-seeds on next access) and the cursor
/// is clamped, falling back to 0. Records are parsed strictly, without the
/// import-path repair: a blob whose records no longer fit the schema is a
/// load failure, and the caller clears the entry and starts over.
pub fn from_persistable(raw: &str) -> Result<(Vec<QuestionRecord>, usize), Error> {
    let value: Value = serde_json::from_str(raw)?;
    let records: Vec<QuestionRecord> = match value.get("questions") {
        Some(Value::Array(items)) => items
            .iter()
            .map(QuestionRecord::deserialize)
            .collect::<Result<_, _>>()?,
        _ => Vec::new(),
    };
    let cursor = value
        .get("currentQuestion")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .filter(|n| *n < records.len())
        .unwrap_or(0);
    Ok((records, cursor))
}

/// The export document: just the question list, pretty-printed.
pub fn to_exportable(records: &[QuestionRecord]) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parses an external question file. Untrusted input: anything that is not
/// a top-level list is refused, and every element is normalized. The caller
/// replaces the store's state and resets the cursor to 0.
pub fn from_import_file(raw: &str) -> Result<Vec<QuestionRecord>, Error> {
    let value: Value = serde_json::from_str(raw).map_err(|_| Error::InvalidFormat)?;
    match value {
        Value::Array(items) => Ok(items.iter().map(QuestionRecord::from_loose).collect()),
        _ => Err(Error::InvalidFormat),
    }
}
