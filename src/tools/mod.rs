//! Tool registry and category definitions.
//!
//! Provides the infrastructure for registering and dispatching MCP tools.

pub mod code;
pub mod events;
pub mod health;
pub mod jobs;
pub mod resources;
pub mod system;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::session::ArcannaSession;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "start_job")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Jobs,
    Events,
    Resources,
    Code,
    Health,
    System,
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
    routes: HashMap<String, Category>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            routes: HashMap::new(),
        };

        registry.register(Category::Jobs, jobs::tools());
        registry.register(Category::Events, events::tools());
        registry.register(Category::Resources, resources::tools());
        registry.register(Category::Code, code::tools());
        registry.register(Category::Health, health::tools());
        registry.register(Category::System, system::tools());

        registry
    }

    fn register(&mut self, category: Category, defs: Vec<ToolDef>) {
        for def in defs {
            self.routes.insert(def.name.clone(), category);
            self.tools.push(def);
        }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    pub async fn dispatch(
        &self,
        session: &ArcannaSession,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        let category = self
            .routes
            .get(name)
            .copied()
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        // No tool runs without a usable host and key, local ones included
        session.settings().validate()?;

        tracing::debug!(tool = name, "dispatching tool call");
        match category {
            Category::Jobs => jobs::dispatch(session, name, args).await,
            Category::Events => events::dispatch(session, name, args).await,
            Category::Resources => resources::dispatch(session, name, args).await,
            Category::Code => code::dispatch(session, name, args).await,
            Category::Health => health::dispatch(session, name, args).await,
            Category::System => system::dispatch(name, args),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), $crate::schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only optional properties
    (object {
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut props = serde_json::Map::new();
        $(props.insert($opt_name.to_string(), $crate::schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": []
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type object) => { serde_json::json!({"type": "object"}) };
    (@type any) => { serde_json::json!({}) };
    (@type resource_type) => {
        serde_json::json!({"type": "string", "enum": ["api_key", "integration", "job"]})
    };
    (@type integer_or_list) => {
        serde_json::json!({"anyOf": [
            {"type": "integer"},
            {"type": "array", "items": {"type": "integer"}}
        ]})
    };
    (@type string_or_list) => {
        serde_json::json!({"anyOf": [
            {"type": "string"},
            {"type": "array", "items": {"type": "string"}}
        ]})
    };
    (@type object_or_string) => {
        serde_json::json!({"anyOf": [{"type": "object"}, {"type": "string"}]})
    };
    (@type array_object) => { serde_json::json!({"type": "array", "items": {"type": "object"}}) };
}
