//! Local system tools.
//!
//! Tools: get_system_timestamp

use chrono::Utc;
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Get all system tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "get_system_timestamp",
        "Get the current UTC timestamp (YYYY-MM-DDTHH:MM:SSZ). Use it whenever the current time is needed, \
         e.g. to build start_date/end_date for event queries.",
        schema!(object {}),
    )]
}

/// Dispatch a system tool call.
pub fn dispatch(name: &str, _args: Map<String, JsonValue>) -> Result<JsonValue> {
    match name {
        "get_system_timestamp" => Ok(JsonValue::String(
            Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        )),
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
