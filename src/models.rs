//! Typed shapes for the structured arguments the Arcanna API accepts.
//!
//! These exist to reject malformed input before a request is sent; the
//! serialized form is exactly what the API expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Resource types handled by the generic CRUD endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    ApiKey,
    Integration,
    Job,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::ApiKey => "api_key",
            ResourceType::Integration => "integration",
            ResourceType::Job => "job",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "api_key" => Ok(ResourceType::ApiKey),
            "integration" => Ok(ResourceType::Integration),
            "job" => Ok(ResourceType::Job),
            other => Err(McpError::invalid_arg(
                "resource_type",
                format!("'{}' is not one of api_key, integration, job", other),
            )),
        }
    }
}

/// A resource definition in an upsert request, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    ApiKey {
        properties: ApiKeyProperties,
        #[serde(default)]
        depends_on: Vec<String>,
    },
    Integration {
        properties: IntegrationProperties,
        #[serde(default)]
        depends_on: Vec<String>,
    },
    Job {
        properties: JobProperties,
        #[serde(default)]
        depends_on: Vec<String>,
    },
}

impl Resource {
    /// Fill in derived fields; an API key's title is its name.
    pub fn normalized(mut self) -> Self {
        if let Resource::ApiKey { properties, .. } = &mut self {
            properties.title = Some(properties.name.clone());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationProperties {
    pub title: String,
    pub integration_type: String,
    pub parameters: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProperties {
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub pipeline_integrations: Vec<PipelineIntegration>,
    /// decision_points, advanced_settings and other job settings
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineIntegration {
    pub resource: String,
    /// Role of the integration in the pipeline (input, processor, output, ...)
    pub integration_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_id: Option<String>,
    #[serde(default)]
    pub parameters: Map<String, JsonValue>,
}

fn default_true() -> bool {
    true
}

/// Parse the `resources` argument of `upsert_resources`.
pub fn parse_resources(value: &Map<String, JsonValue>) -> Result<Map<String, JsonValue>> {
    if value.is_empty() {
        return Err(McpError::invalid_arg("resources", "at least one resource is required"));
    }

    let mut out = Map::new();
    for (id, definition) in value {
        let resource: Resource = serde_json::from_value(definition.clone())
            .map_err(|e| McpError::invalid_arg("resources", format!("resource '{}': {}", id, e)))?;
        let json = serde_json::to_value(resource.normalized())
            .map_err(|e| McpError::Internal(e.to_string()))?;
        out.insert(id.clone(), json);
    }
    Ok(out)
}

/// Operators accepted in event query filters.
pub const FILTER_OPERATORS: &[&str] = &[
    "is",
    "is not",
    "is one of",
    "is not one of",
    "starts with",
    "not starts with",
    "contains",
    "not contains",
    "exists",
    "not exists",
    "lt",
    "lte",
    "gt",
    "gte",
];

/// One filter of an event query. Filters are AND-ed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
}

impl EventFilter {
    pub fn validate(&self) -> Result<()> {
        if self.field.trim().is_empty() {
            return Err(McpError::invalid_arg("filters", "filter field must not be empty"));
        }
        if !FILTER_OPERATORS.contains(&self.operator.as_str()) {
            return Err(McpError::invalid_arg(
                "filters",
                format!("unsupported operator '{}'", self.operator),
            ));
        }
        let takes_value = !matches!(self.operator.as_str(), "exists" | "not exists");
        if takes_value && self.value.is_none() {
            return Err(McpError::invalid_arg(
                "filters",
                format!("operator '{}' on '{}' requires a value", self.operator, self.field),
            ));
        }
        Ok(())
    }
}

/// Environment variable passed to custom code execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default)]
    pub should_encrypt: bool,
}

/// Execution settings for custom code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ExecutionLimits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_time_limit_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_mb: Option<u64>,
}
