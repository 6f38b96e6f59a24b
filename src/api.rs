//! Arcanna REST endpoints and the request description tools produce.
//!
//! Tools never talk HTTP directly: each builds an [`ApiRequest`] from its
//! arguments, and the session turns it into a concrete call.

use serde_json::Value as JsonValue;

use crate::config::KeyScope;

pub const JOBS: &str = "/api/v1/jobs";
pub const JOB_BY_NAME: &str = "/api/v1/jobs/get_by_name";
pub const JOB_LABELS_BY_NAME: &str = "/api/v1/jobs/get_by_name/labels";
pub const EVENTS: &str = "/api/v1/events";
pub const HEALTH: &str = "/api/v1/health/";
pub const CODE_EXECUTION_TEST: &str = "/api/v2/custom_code_execution/test";
pub const CODE_EXECUTION_SAVE: &str = "/api/v2/custom_code_execution/save";
pub const RESOURCES: &str = "/api/v2/resources";
pub const INTEGRATION_PARAMETERS_SCHEMA: &str = "/api/v2/resources/integration/parameters/schema";
pub const QUERY_EVENTS: &str = "/api/v2/events/query";
pub const FILTER_FIELDS: &str = "/api/v2/filters/fields";

/// `/api/v1/jobs/{job_id}`
pub fn job(job_id: u64) -> String {
    format!("{}/{}", JOBS, job_id)
}

/// `/api/v1/jobs/{job_id}/labels`
pub fn job_labels(job_id: u64) -> String {
    format!("{}/{}/labels", JOBS, job_id)
}

/// `/api/v1/jobs/{job_id}/{start|stop|train}`
pub fn job_action(job_id: u64, action: JobAction) -> String {
    format!("{}/{}/{}", JOBS, job_id, action.as_str())
}

/// `/api/v1/events/{event_id}`
pub fn event_with_id(event_id: &str) -> String {
    format!("{}/{}", EVENTS, urlencoding::encode(event_id))
}

/// `/api/v1/events/{job_id}/{event_id}`
pub fn event(job_id: u64, event_id: &str) -> String {
    format!("{}/{}/{}", EVENTS, job_id, urlencoding::encode(event_id))
}

/// `/api/v1/events/{job_id}/{event_id}/feedback`
pub fn event_feedback(job_id: u64, event_id: &str) -> String {
    format!("{}/feedback", event(job_id, event_id))
}

/// Lifecycle actions on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Start,
    Stop,
    Train,
}

impl JobAction {
    pub fn as_str(self) -> &'static str {
        match self {
            JobAction::Start => "start",
            JobAction::Stop => "stop",
            JobAction::Train => "train",
        }
    }
}

/// HTTP method of an upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A host-independent description of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to `ARCANNA_HOST`, already percent-encoded
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub scope: KeyScope,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            scope: KeyScope::Management,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present.
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Set the JSON body.
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Send with the given key scope.
    pub fn scope(mut self, scope: KeyScope) -> Self {
        self.scope = scope;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_is_path_encoded() {
        assert_eq!(event_with_id("abc-123"), "/api/v1/events/abc-123");
        assert_eq!(event_with_id("a/b c"), "/api/v1/events/a%2Fb%20c");
        assert_eq!(event_feedback(4, "e 1"), "/api/v1/events/4/e%201/feedback");
    }

    #[test]
    fn test_job_paths() {
        assert_eq!(job(12), "/api/v1/jobs/12");
        assert_eq!(job_labels(12), "/api/v1/jobs/12/labels");
        assert_eq!(job_action(12, JobAction::Train), "/api/v1/jobs/12/train");
    }

    #[test]
    fn test_request_builder_defaults_to_management() {
        let req = ApiRequest::get(JOBS).query_opt("role", None::<String>);
        assert_eq!(req.scope, KeyScope::Management);
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
    }
}
