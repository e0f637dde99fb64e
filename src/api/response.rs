//! Response envelope

use crate::resolve::{ErrorKind, LocationInfo, ResolutionResult};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Code carried by successful responses
pub const SUCCESS_CODE: u16 = 0;

/// `{code, message, data}` wrapper around every API answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            code: kind.code(),
            message: message.into(),
            data: None,
        }
    }
}

impl From<ResolutionResult> for ApiResponse<LocationInfo> {
    fn from(result: ResolutionResult) -> Self {
        match result {
            ResolutionResult::Success(info) => ApiResponse::success(info),
            ResolutionResult::Failure(kind, detail) => ApiResponse::error(kind, detail),
        }
    }
}

/// HTTP status for a failure kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unsupported => StatusCode::NOT_IMPLEMENTED,
    }
}

impl IntoResponse for ResolutionResult {
    fn into_response(self) -> Response {
        let status = self.error_kind().map(status_for).unwrap_or(StatusCode::OK);
        (status, Json(ApiResponse::from(self))).into_response()
    }
}

/// Give the bare 408 from the timeout layer an envelope body
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    let body = ApiResponse::<LocationInfo>::error(ErrorKind::BackendUnavailable, "request timed out");
    (StatusCode::REQUEST_TIMEOUT, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let info = LocationInfo {
            ip: "8.8.8.8".to_string(),
            ..LocationInfo::default()
        };
        let json = serde_json::to_value(ApiResponse::from(ResolutionResult::Success(info))).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"]["ip"], "8.8.8.8");
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let result = ResolutionResult::failure(ErrorKind::NotFound, "no record for address");
        let json = serde_json::to_value(ApiResponse::from(result)).unwrap();
        assert_eq!(json["code"], 3);
        assert_eq!(json["message"], "no record for address");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_statuses() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::BackendUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Unsupported), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_envelope_parses_back() {
        let text = r#"{"code":1,"message":"address required"}"#;
        let parsed: ApiResponse<LocationInfo> = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, ApiResponse::error(ErrorKind::InvalidInput, "address required"));
    }
}
