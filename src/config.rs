//! Process-wide configuration.
//!
//! Settings are fixed for the lifetime of the process. Values are kept as
//! given and only validated when a request needs them, so a missing host or
//! key shows up as a configuration error on every tool call.

use std::time::Duration;

use reqwest::Url;

use crate::error::{McpError, Result};

/// Default HTTP timeout for upstream calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Prefix applied to the configured user in audit fields.
const USER_PREFIX: &str = "MCP-";

/// Which Arcanna API key a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// Administrative operations (jobs, resources, code execution).
    Management,
    /// Event ingestion. Falls back to the management key when unset.
    Input,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the Arcanna instance (`ARCANNA_HOST`)
    pub host: Option<String>,
    /// `ARCANNA_MANAGEMENT_API_KEY`
    pub management_api_key: Option<String>,
    /// `ARCANNA_INPUT_API_KEY`
    pub input_api_key: Option<String>,
    /// `ARCANNA_USER`
    pub user: Option<String>,
    /// Upstream request timeout
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: None,
            management_api_key: None,
            input_api_key: None,
            user: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Settings with a host and a management key.
    pub fn new(host: impl Into<String>, management_api_key: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            management_api_key: Some(management_api_key.into()),
            ..Self::default()
        }
    }

    /// Set a dedicated input API key.
    pub fn with_input_api_key(mut self, key: impl Into<String>) -> Self {
        self.input_api_key = Some(key.into());
        self
    }

    /// Set the user recorded on start/stop/train and feedback calls.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the upstream request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The validated host, without trailing slashes.
    pub fn base_url(&self) -> Result<String> {
        let host = non_blank(&self.host)
            .ok_or_else(|| McpError::Config("ARCANNA_HOST is not set".to_string()))?;
        let trimmed = host.trim_end_matches('/');

        let url = Url::parse(trimmed)
            .map_err(|e| McpError::Config(format!("ARCANNA_HOST '{}' is not a valid URL: {}", host, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(trimmed.to_string()),
            other => Err(McpError::Config(format!(
                "ARCANNA_HOST must use http or https, got '{}'",
                other
            ))),
        }
    }

    /// The API key for the given scope.
    pub fn api_key(&self, scope: KeyScope) -> Result<&str> {
        let management = || {
            non_blank(&self.management_api_key).ok_or_else(|| {
                McpError::Config("ARCANNA_MANAGEMENT_API_KEY is not set".to_string())
            })
        };

        match scope {
            KeyScope::Management => management(),
            KeyScope::Input => match non_blank(&self.input_api_key) {
                Some(key) => Ok(key),
                None => management(),
            },
        }
    }

    /// Username sent to Arcanna, e.g. `MCP-alice`.
    pub fn username(&self) -> String {
        let user = non_blank(&self.user).unwrap_or("user");
        format!("{}{}", USER_PREFIX, user)
    }

    /// Check everything a tool call needs.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        self.api_key(KeyScope::Management)?;
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_host_is_config_error() {
        let settings = Settings {
            management_api_key: Some("k".into()),
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, McpError::Config(ref m) if m.contains("ARCANNA_HOST")));
    }

    #[test]
    fn test_blank_host_is_missing() {
        let settings = Settings::new("   ", "k");
        assert!(matches!(settings.base_url(), Err(McpError::Config(_))));
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let settings = Settings::new("https://arcanna.example.com/", "k");
        assert_eq!(settings.base_url().unwrap(), "https://arcanna.example.com");
    }

    #[test]
    fn test_host_rejects_other_schemes() {
        let settings = Settings::new("ftp://arcanna.example.com", "k");
        assert!(matches!(settings.base_url(), Err(McpError::Config(_))));
        let settings = Settings::new("not a url", "k");
        assert!(matches!(settings.base_url(), Err(McpError::Config(_))));
    }

    #[test]
    fn test_input_key_falls_back_to_management() {
        let settings = Settings::new("https://a.test", "mgmt");
        assert_eq!(settings.api_key(KeyScope::Input).unwrap(), "mgmt");

        let settings = settings.with_input_api_key("input");
        assert_eq!(settings.api_key(KeyScope::Input).unwrap(), "input");
        assert_eq!(settings.api_key(KeyScope::Management).unwrap(), "mgmt");
    }

    #[test]
    fn test_missing_management_key() {
        let settings = Settings {
            host: Some("https://a.test".into()),
            ..Settings::default()
        };
        assert!(matches!(
            settings.api_key(KeyScope::Management),
            Err(McpError::Config(ref m)) if m.contains("MANAGEMENT")
        ));
    }

    #[test]
    fn test_username() {
        assert_eq!(Settings::default().username(), "MCP-user");
        assert_eq!(Settings::default().with_user("alice").username(), "MCP-alice");
    }
}
