//! Custom code block tools.
//!
//! Tools: generate_code_agent, execute_code, save_code
//!
//! Generation happens in the calling model: `generate_code_agent` hands it
//! the template and contract, execution and saving run on Arcanna.

use serde_json::{Map, Value as JsonValue};

use crate::api::{self, ApiRequest};
use crate::convert::{
    get_object_arg, get_optional_string, get_optional_typed, get_optional_u64, get_string_arg,
    get_u64_arg,
};
use crate::error::{McpError, Result};
use crate::models::{EnvVariable, ExecutionSettings};
use crate::schema;
use crate::session::ArcannaSession;
use crate::tools::ToolDef;

/// Signature every code block must implement.
pub const TRANSFORM_TEMPLATE: &str = "def transform(input_record):\n    # body of the function\n    return input_record\n";

const EXECUTION_ARGS: &str = "input_test is the test record (object or JSON string). \
env_variables is a list of {name, value, is_secret, should_encrypt}. settings is \
{limits: {cpu_time_limit_seconds, memory_limit_mb}}. Returns stdout, stderr and output_record. \
Ask the user for approval first; on an internal server error show it and ask how to continue.";

/// Get all code tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "generate_code_agent",
            "Use when code generation is requested. Returns the Python template the code block \
             must follow together with the request; write the function body, show it to the \
             user, then offer to run it with execute_code.",
            schema!(object {
                required: { "user_query": string }
            }),
        ),
        ToolDef::new(
            "execute_code",
            &format!(
                "Run a Python transform(input_record) function on Arcanna's sandbox. {}",
                EXECUTION_ARGS
            ),
            schema!(object {
                required: { "source_code": string, "input_test": object_or_string },
                optional: { "job_id": integer, "env_variables": array_object, "settings": object }
            }),
        ),
        ToolDef::new(
            "save_code",
            &format!(
                "Save a code block as an integration on the given job. reprocess_event_id \
                 optionally re-runs an event through it. {}",
                EXECUTION_ARGS
            ),
            schema!(object {
                required: {
                    "title": string,
                    "description": string,
                    "source_code": string,
                    "job_id": integer,
                    "input_test": object_or_string
                },
                optional: {
                    "reprocess_event_id": string,
                    "env_variables": array_object,
                    "settings": object
                }
            }),
        ),
    ]
}

/// Dispatch a code tool call.
pub async fn dispatch(
    session: &ArcannaSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "generate_code_agent" => {
            let user_query = get_string_arg(&args, "user_query")?;
            Ok(generation_contract(&user_query))
        }
        "execute_code" => session.call(execute_request(&args)?).await,
        "save_code" => session.call(save_request(&args)?).await,
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// What the calling model needs to produce a code block.
pub fn generation_contract(user_query: &str) -> JsonValue {
    serde_json::json!({
        "user_query": user_query,
        "language": "python",
        "template": TRANSFORM_TEMPLATE,
        "instructions": "Implement transform(input_record) so it fulfils user_query. \
            Modify and return input_record; keep the function name and signature. \
            Then ask the user whether to run it with execute_code.",
    })
}

/// `POST /api/v2/custom_code_execution/test`
pub fn execute_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let mut body = Map::new();
    body.insert("source_code".to_string(), get_string_arg(args, "source_code")?.into());
    body.insert("input_test".to_string(), get_object_arg(args, "input_test")?.into());
    if let Some(job_id) = get_optional_u64(args, "job_id")?.filter(|id| *id > 0) {
        body.insert("job_id".to_string(), job_id.into());
    }
    insert_execution_options(&mut body, args)?;

    Ok(ApiRequest::post(api::CODE_EXECUTION_TEST).json(JsonValue::Object(body)))
}

/// `POST /api/v2/custom_code_execution/save`
pub fn save_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let mut body = Map::new();
    body.insert("title".to_string(), get_string_arg(args, "title")?.into());
    body.insert("description".to_string(), get_string_arg(args, "description")?.into());
    body.insert("job_id".to_string(), get_u64_arg(args, "job_id")?.into());
    body.insert("source_code".to_string(), get_string_arg(args, "source_code")?.into());
    body.insert("input_test".to_string(), get_object_arg(args, "input_test")?.into());
    if let Some(event_id) = get_optional_string(args, "reprocess_event_id")? {
        body.insert("reprocess_event_id".to_string(), event_id.into());
    }
    insert_execution_options(&mut body, args)?;

    Ok(ApiRequest::post(api::CODE_EXECUTION_SAVE).json(JsonValue::Object(body)))
}

fn insert_execution_options(body: &mut Map<String, JsonValue>, args: &Map<String, JsonValue>) -> Result<()> {
    let env_variables: Option<Vec<EnvVariable>> = get_optional_typed(args, "env_variables")?;
    if let Some(vars) = env_variables.filter(|v| !v.is_empty()) {
        let vars = serde_json::to_value(vars).map_err(|e| McpError::Internal(e.to_string()))?;
        body.insert("env_variables".to_string(), vars);
    }

    let settings: Option<ExecutionSettings> = get_optional_typed(args, "settings")?;
    if let Some(settings) = settings {
        let settings = serde_json::to_value(settings).map_err(|e| McpError::Internal(e.to_string()))?;
        body.insert("settings".to_string(), settings);
    }
    Ok(())
}
