//! Health check tool.
//!
//! Tools: health_check

use serde_json::{Map, Value as JsonValue};

use crate::api::{self, ApiRequest};
use crate::convert::{parse_body, translate_response};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::ArcannaSession;
use crate::tools::ToolDef;
use crate::transport::HttpResponse;

/// Get all health tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "health_check",
        "Check that the Arcanna API is reachable and the configured API key is valid. \
         authorized is false when the server is up but rejects the key.",
        schema!(object {}),
    )]
}

/// Dispatch a health tool call.
pub async fn dispatch(
    session: &ArcannaSession,
    name: &str,
    _args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "health_check" => {
            let response = session.execute(ApiRequest::get(api::HEALTH)).await?;
            health_report(response)
        }
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// `authorized` is true exactly when the status call succeeded.
///
/// A rejected key (401/403) is a report, not an error; other failures are.
pub fn health_report(response: HttpResponse) -> Result<JsonValue> {
    match response.status {
        401 | 403 => Ok(serde_json::json!({
            "authorized": false,
            "status_code": response.status,
            "response": parse_body(&response.body),
        })),
        status => {
            let body = translate_response(response)?;
            Ok(serde_json::json!({
                "authorized": true,
                "status_code": status,
                "response": body,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_key_is_not_an_error() {
        let report = health_report(HttpResponse::new(401, r#"{"detail":"invalid key"}"#)).unwrap();
        assert_eq!(report["authorized"], false);
        assert_eq!(report["status_code"], 401);
    }

    #[test]
    fn test_server_error_is_upstream_error() {
        let err = health_report(HttpResponse::new(502, "bad gateway")).unwrap_err();
        assert!(matches!(err, McpError::Upstream { status: 502, .. }));
    }
}
