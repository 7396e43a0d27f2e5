//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/auth` - 가입, 로그인, 로그아웃, 현재 사용자
//! - `/api/books` - 도서 (목록은 관리자 전용)

pub mod auth;
pub mod books;
pub mod health;

pub use auth::{
    auth_router, LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest,
    RegisterResponse,
};
pub use books::{books_router, BookListResponse, BookResponse};
pub use health::{health_router, HealthResponse};

use axum::Router;
use std::sync::Arc;

use crate::auth::AccessGate;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 보호된 라우트의 게이트는 상태와 같은 검증기를 공유해야 하므로 인자로 받습니다.
pub fn create_api_router(gate: &AccessGate) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/auth", auth_router(gate))
        .nest("/api/books", books_router(gate))
}
