use serde_json::Value as JsonValue;

use crate::error::{MergeError, Result};

use super::model::Source;

/// A validated merge request as posted by a browser client:
///
/// ```json
/// {
///   "files": [ { "name": "a.txt", "content": "4000 0.1\n..." }, ... ],
///   "name": "batch-7"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub sources: Vec<Source>,
    /// Requested output name, before sanitization.
    pub output_name: Option<String>,
}

/// Validate a request body. Either every source is well-formed or the
/// whole request is rejected; nothing is merged on failure.
pub fn parse_merge_request(root: &JsonValue) -> Result<MergeRequest> {
    let obj = root
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object"))?;

    let files = obj
        .get("files")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| invalid("'files' must be an array"))?;

    let sources = files
        .iter()
        .enumerate()
        .map(|(i, f)| parse_source(f, i))
        .collect::<Result<Vec<_>>>()?;

    // A non-string name is treated as absent rather than as an error.
    let output_name = obj
        .get("name")
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    Ok(MergeRequest {
        sources,
        output_name,
    })
}

fn parse_source(val: &JsonValue, idx: usize) -> Result<Source> {
    let obj = val
        .as_object()
        .ok_or_else(|| invalid(format!("files[{idx}] is not an object")))?;
    let name = string_field(obj, "name", idx)?;
    let content = string_field(obj, "content", idx)?;
    Ok(Source::new(name, content))
}

fn string_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    field: &str,
    idx: usize,
) -> Result<&'a str> {
    obj.get(field)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| invalid(format!("files[{idx}].{field} must be a string")))
}

fn invalid(msg: impl Into<String>) -> MergeError {
    MergeError::InvalidPayload(msg.into())
}
