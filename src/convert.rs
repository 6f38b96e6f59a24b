//! Conversion utilities between tool arguments, HTTP responses and JSON.
//!
//! Argument helpers read typed values out of the `arguments` object of a
//! `tools/call` request. Response translation turns an upstream reply into
//! either a payload for the model or an [`McpError`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::transport::HttpResponse;

/// Parse an upstream body: empty is `null`, non-JSON text is kept as a string.
pub fn parse_body(body: &str) -> JsonValue {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| JsonValue::String(body.to_string()))
}

/// Translate an upstream response into a tool payload.
///
/// 2xx bodies pass through unchanged in shape; anything else becomes
/// [`McpError::Upstream`] carrying the status and body.
pub fn translate_response(response: HttpResponse) -> Result<JsonValue> {
    let body = parse_body(&response.body);
    if response.is_success() {
        Ok(body)
    } else {
        Err(McpError::Upstream {
            status: response.status,
            body,
        })
    }
}

/// Helper to get a required string argument from JSON arguments.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::String(s)) if s.trim().is_empty() => {
            Err(McpError::invalid_arg(name, "must not be empty"))
        }
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(McpError::invalid_arg(name, "expected a string")),
    }
}

/// Helper to get an optional string argument; blank strings count as absent.
///
/// Arcanna hands out numeric ids, so numbers are accepted and stringified.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(McpError::invalid_arg(name, "expected a string")),
    }
}

/// Helper to get a required u64 argument. Numeric strings are accepted.
pub fn get_u64_arg(args: &Map<String, JsonValue>, name: &str) -> Result<u64> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Err(McpError::MissingArg(name.to_string())),
        Some(v) => as_u64(v).ok_or_else(|| McpError::invalid_arg(name, "expected a non-negative integer")),
    }
}

/// Helper to get an optional u64 argument.
pub fn get_optional_u64(args: &Map<String, JsonValue>, name: &str) -> Result<Option<u64>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(_) => get_u64_arg(args, name).map(Some),
    }
}

/// Helper to get an optional boolean argument.
pub fn get_optional_bool(args: &Map<String, JsonValue>, name: &str) -> Result<Option<bool>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(McpError::invalid_arg(name, "expected a boolean")),
    }
}

/// Helper to get a required JSON object argument.
///
/// Models often send nested objects as JSON text, so a string holding an
/// object is accepted too.
pub fn get_object_arg(args: &Map<String, JsonValue>, name: &str) -> Result<Map<String, JsonValue>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Err(McpError::MissingArg(name.to_string())),
        Some(JsonValue::Object(obj)) => Ok(obj.clone()),
        Some(JsonValue::String(s)) => match serde_json::from_str::<JsonValue>(s) {
            Ok(JsonValue::Object(obj)) => Ok(obj),
            _ => Err(McpError::invalid_arg(name, "expected a JSON object")),
        },
        Some(_) => Err(McpError::invalid_arg(name, "expected a JSON object")),
    }
}

/// Helper to deserialize an optional argument into a typed value.
pub fn get_optional_typed<T: DeserializeOwned>(
    args: &Map<String, JsonValue>,
    name: &str,
) -> Result<Option<T>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| McpError::invalid_arg(name, e.to_string())),
    }
}

/// Helper to get a list of u64 where a single value is also accepted.
pub fn get_u64_list(args: &Map<String, JsonValue>, name: &str) -> Result<Option<Vec<u64>>> {
    let invalid = || McpError::invalid_arg(name, "expected an integer or a list of integers");
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|v| as_u64(v).ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(v) => as_u64(v).map(|n| Some(vec![n])).ok_or_else(invalid),
    }
}

/// Helper to get a list of strings where a single string is also accepted.
pub fn get_string_list(args: &Map<String, JsonValue>, name: &str) -> Result<Option<Vec<String>>> {
    let invalid = || McpError::invalid_arg(name, "expected a string or a list of strings");
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(JsonValue::String(s)) => Ok(Some(vec![s.clone()])),
        Some(_) => Err(invalid()),
    }
}

fn as_u64(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
