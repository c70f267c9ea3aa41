//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use voyage_core::Error as CoreError;

/// Problem type URI for a request endpoint with no navigable grid cell nearby.
pub const PROBLEM_OFF_GRID: &str = "/problems/off-grid";

/// Problem type URI for routes the planner could not find.
pub const PROBLEM_NO_PATH: &str = "/problems/no-path";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for an unavailable grid store.
pub const PROBLEM_GRID_UNAVAILABLE: &str = "/problems/grid-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// Provides a consistent format for error responses across all microservice endpoints.
///
/// # Example
///
/// ```
/// use voyage_service_shared::{ProblemDetails, PROBLEM_OFF_GRID};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_OFF_GRID,
///     "Off Grid",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("start (60.0, 60.0) is off the navigable grid")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for an off-grid endpoint.
    pub fn off_grid(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_OFF_GRID, "Off Grid", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for an unreachable route.
    pub fn no_path(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NO_PATH, "No Path Found", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 503 Service Unavailable problem.
    pub fn grid_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_GRID_UNAVAILABLE,
            "Grid Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

/// Implement IntoResponse for axum to return ProblemDetails as HTTP responses.
impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert core library errors to ProblemDetails.
///
/// Every variant is matched structurally, never by inspecting the
/// rendered message: each carries the context fields a problem
/// response needs directly.
pub fn from_core_error(error: &CoreError, request_id: &str) -> ProblemDetails {
    match error {
        CoreError::OffGrid { point, lat, lon } => ProblemDetails::off_grid(
            format!("{point} ({lat}, {lon}) is off the navigable grid"),
            request_id,
        ),
        CoreError::NoPath { cause, .. } => {
            ProblemDetails::no_path(format!("no route found: {cause}"), request_id)
        }
        CoreError::SegmentFailed { index, source } => {
            ProblemDetails::no_path(format!("segment {index} failed: {source}"), request_id)
        }
        CoreError::GridUnavailable { reason } => {
            ProblemDetails::grid_unavailable(reason.clone(), request_id)
        }
        CoreError::InvalidRequest { message } => {
            ProblemDetails::bad_request(message.clone(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::{NoPathCause, OffGridPoint};

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(PROBLEM_OFF_GRID, "Off Grid", StatusCode::NOT_FOUND);
        assert_eq!(problem.type_uri, PROBLEM_OFF_GRID);
        assert_eq!(problem.title, "Off Grid");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_with_detail() {
        let problem = ProblemDetails::new(
            PROBLEM_INVALID_REQUEST,
            "Bad Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail("Missing required field 'start'");

        assert_eq!(
            problem.detail.as_deref(),
            Some("Missing required field 'start'")
        );
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid JSON", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"title\":\"Invalid Request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_from_core_error_off_grid() {
        let error = CoreError::OffGrid {
            point: OffGridPoint::Start,
            lat: 60.0,
            lon: 60.0,
        };
        let problem = from_core_error(&error, "req-lib");

        assert_eq!(problem.type_uri, PROBLEM_OFF_GRID);
        assert_eq!(problem.status, 404);
        assert!(problem.detail.as_deref().unwrap().contains("60"));
    }

    #[test]
    fn test_from_core_error_no_path() {
        let error = CoreError::NoPath {
            from_lat: 1.0,
            from_lon: 2.0,
            to_lat: 3.0,
            to_lon: 4.0,
            cause: NoPathCause::DisconnectedBasin,
        };
        let problem = from_core_error(&error, "req-route");

        assert_eq!(problem.type_uri, PROBLEM_NO_PATH);
        assert!(problem.detail.as_deref().unwrap().contains("disconnected"));
    }

    #[test]
    fn test_from_core_error_grid_unavailable() {
        let error = CoreError::GridUnavailable {
            reason: "store not open".to_string(),
        };
        let problem = from_core_error(&error, "req-grid");
        assert_eq!(problem.type_uri, PROBLEM_GRID_UNAVAILABLE);
        assert_eq!(problem.status, 503);
    }
}
