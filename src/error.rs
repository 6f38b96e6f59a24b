//! Error types for the MCP server.
//!
//! Splits failures into protocol errors (reported as JSON-RPC errors) and
//! tool errors (reported to the model as an `isError` tool result).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// Missing or invalid configuration (API key, host).
    #[error("configuration error: {0}")]
    Config(String),

    /// Non-2xx response from the Arcanna API.
    #[error("Arcanna API returned HTTP {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, parsed as JSON when possible
        body: JsonValue,
    },

    /// A named entity could not be resolved.
    #[error("no such {kind}: {name}")]
    NotFound {
        /// Entity kind ("job", "resource", ...)
        kind: String,
        /// The name that was looked up
        name: String,
    },

    /// Connection failure or timeout talking to the Arcanna API.
    #[error("network error: {0}")]
    Network(String),

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Shorthand for an [`McpError::InvalidArg`].
    pub fn invalid_arg(name: &str, reason: impl Into<String>) -> Self {
        McpError::InvalidArg {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a job that could not be resolved by name.
    pub fn job_not_found(name: &str) -> Self {
        McpError::NotFound {
            kind: "job".to_string(),
            name: name.to_string(),
        }
    }

    /// Whether this error belongs in a tool result rather than a JSON-RPC error.
    ///
    /// Configuration, upstream, not-found and network failures are
    /// outcomes of a well-formed call and go back to the model as data.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            McpError::Config(_)
                | McpError::Upstream { .. }
                | McpError::NotFound { .. }
                | McpError::Network(_)
        )
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            McpError::Config(_) => "configuration",
            McpError::Upstream { .. } => "upstream",
            McpError::NotFound { .. } => "not_found",
            McpError::Network(_) => "network",
            McpError::UnknownTool(_) => "unknown_tool",
            McpError::MissingArg(_) => "missing_argument",
            McpError::InvalidArg { .. } => "invalid_argument",
            McpError::Protocol(_) => "protocol",
            McpError::Io(_) => "io",
            McpError::Internal(_) => "internal",
        }
    }

    /// HTTP-style status code reported alongside the error.
    pub fn status_code(&self) -> u16 {
        match self {
            McpError::Upstream { status, .. } => *status,
            McpError::NotFound { .. } => 404,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => 400,
            McpError::Network(_) => 503,
            _ => 500,
        }
    }

    /// Structured payload returned to the model for tool errors.
    pub fn to_payload(&self) -> JsonValue {
        let mut payload = serde_json::json!({
            "kind": self.kind(),
            "status_code": self.status_code(),
            "error_message": self.to_string(),
        });
        if let McpError::Upstream { body, .. } = self {
            payload["body"] = body.clone();
        }
        payload
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            McpError::Network(format!("request timed out: {}", err))
        } else if err.is_builder() {
            McpError::Config(format!("could not build request: {}", err))
        } else {
            McpError::Network(err.to_string())
        }
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } | McpError::NotFound { .. } => {
                rpc_codes::INVALID_PARAMS
            }
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_classification() {
        assert!(McpError::Config("x".into()).is_tool_error());
        assert!(McpError::job_not_found("x").is_tool_error());
        assert!(McpError::Network("x".into()).is_tool_error());
        assert!(!McpError::MissingArg("job_id".into()).is_tool_error());
        assert!(!McpError::UnknownTool("nope".into()).is_tool_error());
    }

    #[test]
    fn test_upstream_payload_carries_status_and_body() {
        let err = McpError::Upstream {
            status: 422,
            body: serde_json::json!({"detail": "bad job"}),
        };
        let payload = err.to_payload();
        assert_eq!(payload["kind"], "upstream");
        assert_eq!(payload["status_code"], 422);
        assert_eq!(payload["body"]["detail"], "bad job");
    }

    #[test]
    fn test_not_found_message() {
        let err = McpError::job_not_found("Phishing triage");
        assert_eq!(err.to_string(), "no such job: Phishing triage");
        assert_eq!(err.to_payload()["status_code"], 404);
    }
}
