//! Resource tools.
//!
//! Tools: integration_parameters_schema, upsert_resources, get_resources,
//! delete_resources

use serde_json::{Map, Value as JsonValue};

use crate::api::{self, ApiRequest};
use crate::convert::{get_object_arg, get_optional_bool, get_optional_string, get_string_arg};
use crate::error::{McpError, Result};
use crate::models::{parse_resources, ResourceType};
use crate::schema;
use crate::session::ArcannaSession;
use crate::tools::ToolDef;

const UPSERT_DESCRIPTION: &str = "Create or update a set of Arcanna resources. `resources` maps a \
local identifier (not saved in Arcanna) to a definition {type, properties, depends_on}. \
Types: 'api_key' with properties {name}; 'integration' with properties {title, integration_type, \
parameters}, where integration types and their parameters come from \
integration_parameters_schema; 'job' with properties {title, category ('Decision intelligence', \
'Event centric decision intelligence' or 'Automated root cause analysis'), description, \
decision_points, advanced_settings {custom_labels [{name, hex_color}]}, pipeline_integrations \
[{resource, integration_type (role: input, processor, output, enrichment, case_creation, \
post_decision), enabled, parameters}]}. A pipeline `resource` may name a resource in the same \
request, an existing integration title, or a query such as \
\"{{integrations(title='Elastic integration')}}\". With overwrite=false, existing resources are \
not changed and an error is returned. Before updating a job, fetch it with get_resources by \
title and confirm the change with the user. The value of a new api_key is only returned once.";

/// Get all resource tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "integration_parameters_schema",
            "Return the JSON schema of integration parameters, for all integrations or one \
             integration_type. With `role`, returns the job-level parameters needed when the \
             integration is used in that pipeline role.",
            schema!(object {
                optional: { "integration_type": string, "role": string }
            }),
        ),
        ToolDef::new(
            "upsert_resources",
            UPSERT_DESCRIPTION,
            schema!(object {
                required: { "resources": object },
                optional: { "overwrite": boolean }
            }),
        ),
        ToolDef::new(
            "get_resources",
            "List Arcanna resources. All parameters are filters; title and id are mutually \
             exclusive (title wins). Without title or id, job details are minimal.",
            schema!(object {
                optional: { "resource_type": resource_type, "title": string, "id": string }
            }),
        ),
        ToolDef::new(
            "delete_resources",
            "Delete the resource of the given type identified by title or id.",
            schema!(object {
                required: { "resource_type": resource_type },
                optional: { "title": string, "id": string }
            }),
        ),
    ]
}

/// Dispatch a resource tool call.
pub async fn dispatch(
    session: &ArcannaSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let request = match name {
        "integration_parameters_schema" => ApiRequest::get(api::INTEGRATION_PARAMETERS_SCHEMA)
            .query_opt("integration_type", get_optional_string(&args, "integration_type")?)
            .query_opt("role", get_optional_string(&args, "role")?),
        "upsert_resources" => upsert_request(&args)?,
        "get_resources" => get_request(&args)?,
        "delete_resources" => delete_request(&args)?,
        _ => return Err(McpError::UnknownTool(name.to_string())),
    };

    session.call(request).await
}

/// `POST /api/v2/resources?overwrite=...`
pub fn upsert_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let resources = parse_resources(&get_object_arg(args, "resources")?)?;
    let overwrite = get_optional_bool(args, "overwrite")?.unwrap_or(false);

    Ok(ApiRequest::post(api::RESOURCES)
        .query("overwrite", overwrite)
        .json(serde_json::json!({ "resources": resources })))
}

/// `GET /api/v2/resources`
pub fn get_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let resource_type = get_optional_string(args, "resource_type")?
        .map(|t| t.parse::<ResourceType>())
        .transpose()?;

    let request = ApiRequest::get(api::RESOURCES).query_opt("resource_type", resource_type);
    with_identity(request, args)
}

/// `DELETE /api/v2/resources`
///
/// Requires a title or id so a delete never targets a whole resource type.
pub fn delete_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let resource_type: ResourceType = get_string_arg(args, "resource_type")?.parse()?;
    if get_optional_string(args, "title")?.is_none() && get_optional_string(args, "id")?.is_none() {
        return Err(McpError::invalid_arg(
            "title",
            "either title or id is required to delete a resource",
        ));
    }

    let request = ApiRequest::delete(api::RESOURCES).query("resource_type", resource_type);
    with_identity(request, args)
}

fn with_identity(request: ApiRequest, args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    Ok(match get_optional_string(args, "title")? {
        Some(title) => request.query("title", title),
        None => request.query_opt("id", get_optional_string(args, "id")?),
    })
}
