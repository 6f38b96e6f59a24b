//! Event tools.
//!
//! Tools: send_event, send_event_with_id, get_event_by_id,
//! send_feedback_for_event, query_arcanna_events, get_filter_fields

use serde_json::{Map, Value as JsonValue};

use crate::api::{self, ApiRequest};
use crate::config::KeyScope;
use crate::convert::{
    get_object_arg, get_optional_bool, get_optional_string, get_optional_typed, get_optional_u64,
    get_string_arg, get_string_list, get_u64_arg, get_u64_list,
};
use crate::error::{McpError, Result};
use crate::models::EventFilter;
use crate::schema;
use crate::session::ArcannaSession;
use crate::tools::ToolDef;

const SEND_EVENT_RETURNS: &str = "Returns event_id, job_id, ingest_timestamp, status and \
error_message. On an internal server error, do not call other tools; ask the user how to continue.";

const QUERY_EVENTS_DESCRIPTION: &str = "Query processed events, filtered by job ids, job titles, \
event ids or field filters. Without job_ids or job_titles all jobs are searched. \
start_date/end_date accept ISO 8601 dates or Elasticsearch date math (now-1d, now-30m). \
size limits events per job. sort_by_column defaults to timestamp_inference, sort_order to desc. \
filters are AND-ed; each is {field, operator, value}. Operators: is, is not, is one of, \
is not one of, starts with, not starts with, contains, not contains, exists, not exists, \
lt, lte, gt, gte (value omitted for exists/not exists). Useful fields: arcanna.result_label \
(decision), arcanna.consensus, arcanna.outlier_flag, arcanna.knowledge_base_state or \
arcanna.bucket_state (in-model status, 'new' means no feedback), \
arcanna.attention.low_confidence_score.attention_required, \
arcanna.attention.undecided_consensus.attention_required. Each returned event has event_id, \
job_id, job_title, decision_points, arcanna and raw_event.";

/// Get all event tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "send_event",
            &format!(
                "Send a JSON event to an Arcanna job for a decision. Arcanna assigns the event id. {}",
                SEND_EVENT_RETURNS
            ),
            schema!(object {
                required: { "job_id": integer, "event": object_or_string }
            }),
        ),
        ToolDef::new(
            "send_event_with_id",
            &format!(
                "Send a JSON event to an Arcanna job under a caller-chosen event id. {}",
                SEND_EVENT_RETURNS
            ),
            schema!(object {
                required: { "job_id": integer, "event": object_or_string, "event_id": string }
            }),
        ),
        ToolDef::new(
            "get_event_by_id",
            "Retrieve an ingested event. Returns event_id, ingest_timestamp, status, result \
             (decision label id), result_label, knowledge_base_state (Pending, In model, Retrain), \
             outlier, confidence_score and error_message.",
            schema!(object {
                required: { "job_id": integer, "event_id": string }
            }),
        ),
        ToolDef::new(
            "send_feedback_for_event",
            "Give feedback on an ingested event. The label (for example Escalate or Drop) is \
             used to train future models. Returns the feedback status.",
            schema!(object {
                required: { "job_id": integer, "event_id": string, "label": string }
            }),
        ),
        ToolDef::new(
            "query_arcanna_events",
            QUERY_EVENTS_DESCRIPTION,
            schema!(object {
                optional: {
                    "job_ids": integer_or_list,
                    "job_titles": string_or_list,
                    "event_ids": string_or_list,
                    "decision_points_only": boolean,
                    "start_date": string,
                    "end_date": string,
                    "size": integer,
                    "sort_by_column": string,
                    "sort_order": string,
                    "filters": array_object
                }
            }),
        ),
        ToolDef::new(
            "get_filter_fields",
            "List the fields that query_arcanna_events can filter on, with the operators each \
             supports and the jobs where it is available.",
            schema!(object {
                optional: { "job_ids": integer_or_list, "job_titles": string_or_list }
            }),
        ),
    ]
}

/// Dispatch an event tool call.
pub async fn dispatch(
    session: &ArcannaSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "send_event" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            let event = get_object_arg(&args, "event")?;
            session.call(send_event_request(job_id, event, None)).await
        }

        "send_event_with_id" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            let event = get_object_arg(&args, "event")?;
            let event_id = get_string_arg(&args, "event_id")?;
            session
                .call(send_event_request(job_id, event, Some(&event_id)))
                .await
        }

        "get_event_by_id" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            let event_id = get_string_arg(&args, "event_id")?;
            session
                .call(ApiRequest::get(api::event(job_id, &event_id)).scope(KeyScope::Input))
                .await
        }

        "send_feedback_for_event" => {
            let job_id = get_u64_arg(&args, "job_id")?;
            let event_id = get_string_arg(&args, "event_id")?;
            let label = get_string_arg(&args, "label")?;
            session
                .call(feedback_request(job_id, &event_id, &label, &session.username()))
                .await
        }

        "query_arcanna_events" => session.call(query_events_request(&args)?).await,

        "get_filter_fields" => session.call(filter_fields_request(&args)?).await,

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// Event ingestion request; with an id the event is stored under it verbatim.
pub fn send_event_request(
    job_id: u64,
    event: Map<String, JsonValue>,
    event_id: Option<&str>,
) -> ApiRequest {
    let path = match event_id {
        Some(id) => api::event_with_id(id),
        None => api::EVENTS.to_string(),
    };
    ApiRequest::post(path)
        .json(serde_json::json!({ "job_id": job_id, "raw_body": event }))
        .scope(KeyScope::Input)
}

/// `PUT /api/v1/events/{job_id}/{event_id}/feedback`
pub fn feedback_request(job_id: u64, event_id: &str, label: &str, username: &str) -> ApiRequest {
    ApiRequest::put(api::event_feedback(job_id, event_id))
        .json(serde_json::json!({ "cortex_user": username, "feedback": label }))
        .scope(KeyScope::Input)
}

/// Build the event query body. Only arguments that are set and non-empty are sent.
pub fn query_events_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let mut body = Map::new();

    if let Some(ids) = get_u64_list(args, "job_ids")?.filter(|v| !v.is_empty()) {
        body.insert("job_ids".to_string(), ids.into());
    }
    if let Some(titles) = get_string_list(args, "job_titles")?.filter(|v| !v.is_empty()) {
        body.insert("job_titles".to_string(), titles.into());
    }
    if let Some(ids) = get_string_list(args, "event_ids")?.filter(|v| !v.is_empty()) {
        body.insert("event_ids".to_string(), ids.into());
    }
    if get_optional_bool(args, "decision_points_only")? == Some(true) {
        body.insert("decision_points_only".to_string(), true.into());
    }
    for key in ["start_date", "end_date", "sort_by_column"] {
        if let Some(value) = get_optional_string(args, key)? {
            body.insert(key.to_string(), value.into());
        }
    }
    if let Some(size) = get_optional_u64(args, "size")?.filter(|s| *s > 0) {
        body.insert("size".to_string(), size.into());
    }
    if let Some(order) = get_optional_string(args, "sort_order")? {
        let order = order.to_lowercase();
        if order != "asc" && order != "desc" {
            return Err(McpError::invalid_arg("sort_order", "expected 'asc' or 'desc'"));
        }
        body.insert("sort_order".to_string(), order.into());
    }

    let filters: Option<Vec<EventFilter>> = get_optional_typed(args, "filters")?;
    if let Some(filters) = filters.filter(|f| !f.is_empty()) {
        for filter in &filters {
            filter.validate()?;
        }
        let filters = serde_json::to_value(filters).map_err(|e| McpError::Internal(e.to_string()))?;
        body.insert("filters".to_string(), filters);
    }

    Ok(ApiRequest::post(api::QUERY_EVENTS).json(JsonValue::Object(body)))
}

/// `POST /api/v2/filters/fields`
pub fn filter_fields_request(args: &Map<String, JsonValue>) -> Result<ApiRequest> {
    let mut body = Map::new();
    if let Some(ids) = get_u64_list(args, "job_ids")?.filter(|v| !v.is_empty()) {
        body.insert("job_ids".to_string(), ids.into());
    }
    if let Some(titles) = get_string_list(args, "job_titles")?.filter(|v| !v.is_empty()) {
        body.insert("job_titles".to_string(), titles.into());
    }
    Ok(ApiRequest::post(api::FILTER_FIELDS).json(JsonValue::Object(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_query_skips_unset_and_falsy_arguments() {
        let req = query_events_request(&args(json!({
            "job_ids": 3,
            "job_titles": [],
            "decision_points_only": false,
            "size": 0,
            "start_date": "now-1d"
        })))
        .unwrap();
        assert_eq!(req.body, Some(json!({"job_ids": [3], "start_date": "now-1d"})));
    }

    #[test]
    fn test_query_rejects_bad_sort_order() {
        let err = query_events_request(&args(json!({"sort_order": "sideways"}))).unwrap_err();
        assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "sort_order"));
    }

    #[test]
    fn test_send_event_uses_input_scope() {
        let req = send_event_request(1, Map::new(), None);
        assert_eq!(req.scope, KeyScope::Input);
        assert_eq!(req.path, "/api/v1/events");
    }
}
