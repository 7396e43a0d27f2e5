//! OpenAPI 문서화 설정.
//!
//! Swagger UI는 `/swagger-ui`, 스펙 JSON은 `/api-docs/openapi.json`에서 제공됩니다.
//! 새 엔드포인트는 핸들러에 `#[utoipa::path(...)]`를 달고 아래 `paths(...)`에 추가합니다.

use axum::Router;
use bookshelf_core::{Book, NewBook, UserProfile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    BookListResponse, BookResponse, HealthResponse, LoginRequest, LoginResponse, MeResponse,
    MessageResponse, RegisterRequest, RegisterResponse,
};

/// Bookshelf API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        description = r#"
# Bookshelf REST API

토큰 기반 인증과 역할별 접근 제어를 제공하는 도서 API입니다.

## 인증

`POST /api/auth/login`으로 받은 토큰을 보호된 엔드포인트에 전달합니다.
전달 방식은 배포 설정(`auth.carrier`)에 따라 하나입니다:
- `bearer` (기본): `Authorization: Bearer <token>` 헤더
- `cookie`: 로그인 시 설정되는 `jwt` 쿠키

`GET /api/books`는 `admin` 역할만 호출할 수 있습니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 가입, 로그인, 로그아웃"),
        (name = "books", description = "도서 - 조회 및 등록")
    ),
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,
            HealthResponse,

            // ===== Auth =====
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            MeResponse,
            MessageResponse,
            UserProfile,

            // ===== Books =====
            Book,
            NewBook,
            BookResponse,
            BookListResponse,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,

        crate::routes::books::list_books,
        crate::routes::books::get_book,
        crate::routes::books::create_book,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
