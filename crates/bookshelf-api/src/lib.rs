//! 토큰 인증 REST API.
//!
//! # 모듈 구성
//!
//! - [`auth`]: 비밀번호 해싱, 자격 증명 확인, 토큰 발급/검증, 접근 제어 게이트
//! - [`repository`]: 사용자/도서 저장소 (PostgreSQL, 인메모리)
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`error`]: 통합 에러 응답
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    hash_password, verify_password, AccessGate, AuthClaims, AuthError, AuthGateError,
    Authenticator, Claims, JwtError, RoleSet, TokenIssuer, TokenVerifier,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with, TEST_JWT_SECRET};
