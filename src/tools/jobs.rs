//! Job tools.
//!
//! Tools: get_jobs, get_job_by_id, get_job_by_name, get_job_labels,
//! get_labels_of_job_by_name, start_job, stop_job, train_job,
//! start_job_by_name, stop_job_by_name, train_job_by_name

use serde_json::{Map, Value as JsonValue};

use crate::api::{self, ApiRequest, JobAction};
use crate::convert::{get_string_arg, get_u64_arg, parse_body, translate_response};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::ArcannaSession;
use crate::tools::ToolDef;

const JOB_FIELDS: &str = "Fields: job_id, category, title, status (ENABLED ingests events, \
DISABLED is stopped, READY_TO_SELECT_FEATURES needs decision points), retrain_state, \
retrain_msg, labels, features (decision points), processed_documents_count, \
feedback_documents_count, last_processed_timestamp, last_feedback_timestamp, \
last_train_start_timestamp, last_train_finished_timestamp, invalid.";

/// Get all job tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "get_jobs",
            &format!("List the Arcanna jobs visible to the configured API key. {}", JOB_FIELDS),
            schema!(object {}),
        ),
        ToolDef::new(
            "get_job_by_id",
            &format!("Get an Arcanna job by id. {}", JOB_FIELDS),
            schema!(object {
                required: { "job_id": integer }
            }),
        ),
        ToolDef::new(
            "get_job_by_name",
            &format!(
                "Get an Arcanna job by name. Fails with a not-found error if no job has this name. {}",
                JOB_FIELDS
            ),
            schema!(object {
                required: { "job_name": string }
            }),
        ),
        ToolDef::new(
            "get_job_labels",
            "Get the decision labels configured for a job.",
            schema!(object {
                required: { "job_id": integer }
            }),
        ),
        ToolDef::new(
            "get_labels_of_job_by_name",
            "Get the decision labels of the job with the given name.",
            schema!(object {
                required: { "job_name": string }
            }),
        ),
        ToolDef::new(
            "start_job",
            "Start a job so it begins ingesting events. Returns status and error_message.",
            schema!(object {
                required: { "job_id": integer }
            }),
        ),
        ToolDef::new(
            "stop_job",
            "Stop a job so it stops ingesting events. Returns status and error_message.",
            schema!(object {
                required: { "job_id": integer }
            }),
        ),
        ToolDef::new(
            "train_job",
            "Train a job so it learns from the feedback given so far. Returns status and error_message.",
            schema!(object {
                required: { "job_id": integer }
            }),
        ),
        ToolDef::new(
            "start_job_by_name",
            "Resolve a job by name, then start it.",
            schema!(object {
                required: { "job_name": string }
            }),
        ),
        ToolDef::new(
            "stop_job_by_name",
            "Resolve a job by name, then stop it.",
            schema!(object {
                required: { "job_name": string }
            }),
        ),
        ToolDef::new(
            "train_job_by_name",
            "Resolve a job by name, then train it.",
            schema!(object {
                required: { "job_name": string }
            }),
        ),
    ]
}

/// Dispatch a job tool call.
pub async fn dispatch(
    session: &ArcannaSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "get_jobs" => session.call(ApiRequest::get(api::JOBS)).await,

        "get_job_by_id" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            session.call(ApiRequest::get(api::job(job_id))).await
        }

        "get_job_labels" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            session.call(ApiRequest::get(api::job_labels(job_id))).await
        }

        "get_job_by_name" => {
            let job_name = get_string_arg(&args, "job_name")?;
            find_job_by_name(session, &job_name).await
        }

        "get_labels_of_job_by_name" => {
            let job_name = get_string_arg(&args, "job_name")?;
            let response = session.execute(labels_by_name_request(&job_name)).await?;
            if response.status == 404 {
                return Err(McpError::job_not_found(&job_name));
            }
            translate_response(response)
        }

        "start_job" | "stop_job" | "train_job" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            let action = action_for(name)?;
            session
                .call(action_request(job_id, action, &session.username()))
                .await
        }

        "start_job_by_name" | "stop_job_by_name" | "train_job_by_name" => {
            let job_name = get_string_arg(&args, "job_name")?;
            let action = action_for(name)?;
            let job_id = resolve_job_id(session, &job_name).await?;
            tracing::debug!(job = %job_name, job_id, action = action.as_str(), "resolved job name");
            session
                .call(action_request(job_id, action, &session.username()))
                .await
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

fn action_for(name: &str) -> Result<JobAction> {
    match name.split('_').next() {
        Some("start") => Ok(JobAction::Start),
        Some("stop") => Ok(JobAction::Stop),
        Some("train") => Ok(JobAction::Train),
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// `POST /api/v1/jobs/{id}/{action}?username=...`
pub fn action_request(job_id: u64, action: JobAction, username: &str) -> ApiRequest {
    ApiRequest::post(api::job_action(job_id, action)).query("username", username)
}

/// `POST /api/v1/jobs/get_by_name`
pub fn by_name_request(job_name: &str) -> ApiRequest {
    ApiRequest::post(api::JOB_BY_NAME).json(serde_json::json!({ "job_name": job_name }))
}

/// `POST /api/v1/jobs/get_by_name/labels`
pub fn labels_by_name_request(job_name: &str) -> ApiRequest {
    ApiRequest::post(api::JOB_LABELS_BY_NAME).json(serde_json::json!({ "job_name": job_name }))
}

/// Look up a job by name.
///
/// Only an object carrying a non-null `job_id` counts as a match; a 404 or
/// an empty reply is a not-found error, never a success payload.
pub async fn find_job_by_name(session: &ArcannaSession, job_name: &str) -> Result<JsonValue> {
    let response = session.execute(by_name_request(job_name)).await?;
    if response.status == 404 {
        return Err(McpError::job_not_found(job_name));
    }
    if !response.is_success() {
        return translate_response(response);
    }

    let job = parse_body(&response.body);
    match job.get("job_id") {
        Some(id) if !id.is_null() => Ok(job),
        _ => Err(McpError::job_not_found(job_name)),
    }
}

/// Resolve a job name to its numeric id.
pub async fn resolve_job_id(session: &ArcannaSession, job_name: &str) -> Result<u64> {
    let job = find_job_by_name(session, job_name).await?;
    job.get("job_id")
        .and_then(|id| match id {
            JsonValue::Number(n) => n.as_u64(),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        })
        .ok_or_else(|| McpError::Internal(format!("job '{}' has a non-numeric job_id", job_name)))
}
