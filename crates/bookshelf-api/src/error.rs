//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트의 에러 본문은 [`ApiErrorResponse`] 한 가지 형식입니다.
//!
//! ```json
//! {
//!   "code": "INVALID_CREDENTIALS",
//!   "message": "invalid credentials",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::repository::RepositoryError;

/// 통합 API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 타임스탬프를 포함한 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 타임스탬프 없는 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: None,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

// ==================== 핸들러 에러 ====================

/// 핸들러에서 반환하는 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// 내부 장애. 상세 내용은 로그에만 남깁니다.
    #[error("server error")]
    Internal(String),
}

impl ApiError {
    /// 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(detail = %detail, "Request failed with internal error");
        }

        let (status, code) = self.status_and_code();
        (status, Json(ApiErrorResponse::new(code, self.to_string()))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::Validation(msg.to_string()),
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Conflict => ApiError::Conflict("email already registered".to_string()),
            AuthError::Unavailable(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(what) => ApiError::Conflict(format!("already exists: {}", what)),
            RepositoryError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 요청 본문 파싱 실패를 검증 에러로 변환.
///
/// `Result<Json<T>, JsonRejection>` 추출과 함께 사용합니다.
pub fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(format!("invalid request body: {}", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
    }

    #[test]
    fn test_json_serialization_simple() {
        let error = ApiErrorResponse::simple("NOT_FOUND", "Resource not found");
        let json = serde_json::to_string(&error).unwrap();

        assert!(!json.contains("timestamp"));
        assert!(json.contains(r#""code":"NOT_FOUND""#));
        assert!(json.contains(r#""message":"Resource not found""#));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("email is required".into()), 422),
            (ApiError::InvalidCredentials, 401),
            (ApiError::Conflict("dup".into()), 409),
            (ApiError::NotFound("book".into()), 404),
            (ApiError::Internal("db down".into()), 500),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status().as_u16(), status);
        }
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::from(AuthError::Unavailable("connection refused".into()));
        assert_eq!(err.to_string(), "server error");
    }

    #[test]
    fn test_auth_error_conversion() {
        assert!(matches!(
            ApiError::from(AuthError::Validation("role is required")),
            ApiError::Validation(m) if m == "role is required"
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::InvalidCredentials
        ));
        assert!(matches!(ApiError::from(AuthError::Conflict), ApiError::Conflict(_)));
    }
}
