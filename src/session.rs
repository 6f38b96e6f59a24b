//! Arcanna API session.
//!
//! Pairs the immutable [`Settings`] with an [`HttpTransport`]. Holds no
//! per-call state, so one session is shared by all concurrent tool calls.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value as JsonValue;

use crate::api::ApiRequest;
use crate::config::Settings;
use crate::convert::translate_response;
use crate::error::{McpError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, API_KEY_HEADER};

/// Session used by every tool.
pub struct ArcannaSession {
    settings: Settings,
    transport: Arc<dyn HttpTransport>,
}

impl ArcannaSession {
    /// Create a session with an explicit transport.
    pub fn new(settings: Settings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Create a session that talks to Arcanna over `reqwest`.
    pub fn connect(settings: Settings) -> Result<Self> {
        let transport = ReqwestTransport::new(settings.timeout)?;
        Ok(Self::new(settings, Arc::new(transport)))
    }

    /// The configuration this session was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Username recorded on lifecycle and feedback calls.
    pub fn username(&self) -> String {
        self.settings.username()
    }

    /// Resolve an [`ApiRequest`] against the configured host and key.
    pub fn resolve(&self, request: ApiRequest) -> Result<HttpRequest> {
        let base = self.settings.base_url()?;
        let api_key = self.settings.api_key(request.scope)?;

        let raw = format!("{}{}", base, request.path);
        let url = if request.query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, &request.query)
        }
        .map_err(|e| McpError::Config(format!("cannot build URL from ARCANNA_HOST: {}", e)))?;

        Ok(HttpRequest {
            method: request.method,
            url: url.into(),
            headers: vec![
                (API_KEY_HEADER.to_string(), api_key.to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: request.body,
        })
    }

    /// Send a request and return the raw response, whatever its status.
    pub async fn execute(&self, request: ApiRequest) -> Result<HttpResponse> {
        let http = self.resolve(request)?;
        let method = http.method;
        let url = http.url.clone();

        tracing::debug!(method = method.as_str(), %url, "calling Arcanna");
        let response = self.transport.send(http).await.map_err(|e| {
            tracing::warn!(method = method.as_str(), %url, error = %e, "Arcanna call failed");
            e
        })?;
        tracing::debug!(method = method.as_str(), %url, status = response.status, "Arcanna responded");

        Ok(response)
    }

    /// Send a request and translate the response into a tool payload.
    pub async fn call(&self, request: ApiRequest) -> Result<JsonValue> {
        let response = self.execute(request).await?;
        translate_response(response)
    }
}
