//! Conversion of raw item source records into [`Item`]s.
//!
//! Commit and pull request records have different shapes; both collapse into the
//! same `Item`. Any record without `html_url` fails the whole batch.

use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{Item, Mode};

/// Normalize a full listing response.
///
/// Anything other than a JSON array (the item source answers errors with an
/// object) is treated as an empty listing.
pub fn normalize_payload(payload: &Value, mode: Mode) -> Result<Vec<Item>, FetchError> {
    let Some(records) = payload.as_array() else {
        debug!(?mode, "Item source returned a non-list payload; treating as empty");
        return Ok(Vec::new());
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(record, mode, index))
        .collect()
}

/// Normalize one record. `index` is only used for error reporting.
pub fn normalize_record(record: &Value, mode: Mode, index: usize) -> Result<Item, FetchError> {
    let key = string_field(record, "html_url").ok_or(FetchError::MissingField {
        index,
        field: "html_url",
    })?;

    let item = match mode {
        Mode::PullRequests => Item {
            key,
            title: string_field(record, "title").unwrap_or_default(),
            body: string_field(record, "body").unwrap_or_default(),
            source_id: id_field(record).unwrap_or_default(),
            sha: None,
        },
        Mode::Commits => {
            let message = record
                .get("commit")
                .and_then(|commit| commit.get("message"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let sha = string_field(record, "sha");
            Item {
                key,
                title: first_line(&message).to_string(),
                body: message,
                source_id: sha.clone().unwrap_or_default(),
                sha,
            }
        }
    };

    Ok(item)
}

fn string_field(record: &Value, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_string)
}

fn id_field(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}
