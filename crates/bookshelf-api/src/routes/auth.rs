//! 인증 endpoint.
//!
//! - `POST /api/auth/register` - 가입
//! - `POST /api/auth/login` - 로그인 (토큰 + 쿠키 발급)
//! - `POST /api/auth/logout` - 쿠키 만료
//! - `GET /api/auth/me` - 토큰의 사용자 정보

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::SET_COOKIE,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bookshelf_core::{CookieConfig, User, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::{required, require_role, AccessGate, AuthClaims, IssuedToken, RoleSet};
use crate::error::{invalid_body, ApiError, ApiErrorResponse, ApiResult};
use crate::metrics::record_login_attempt;
use crate::state::AppState;

/// 쿠키 `Expires` 속성 형식 (RFC 7231 IMF-fixdate).
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// ==================== 요청/응답 타입 ====================

/// 가입 요청. 필드가 없거나 비어 있으면 422.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// 가입 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub data: UserProfile,
}

/// 로그인 요청.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// 발급된 토큰
    pub token: String,
    /// 만료 시각 (Unix timestamp)
    pub exp: i64,
}

/// 현재 사용자 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

/// 메시지만 담은 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== 쿠키 ====================

/// 로그인 쿠키 `Set-Cookie` 값.
pub fn session_cookie(config: &CookieConfig, token: &str, expires_at: DateTime<Utc>) -> String {
    cookie_header(config, token, &expires_at.format(COOKIE_DATE_FORMAT).to_string())
}

/// 로그아웃 쿠키. 같은 이름, 빈 값, 과거 만료 시각.
pub fn expired_cookie(config: &CookieConfig) -> String {
    let mut cookie = cookie_header(config, "", "Thu, 01 Jan 1970 00:00:00 GMT");
    cookie.push_str("; Max-Age=0");
    cookie
}

fn cookie_header(config: &CookieConfig, value: &str, expires: &str) -> String {
    let mut cookie = format!("{}={}; Path=/; Expires={}", config.name, value, expires);
    if let Some(domain) = &config.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if config.http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie.push_str("; SameSite=");
    cookie.push_str(config.same_site.as_str());
    cookie
}

// ==================== 핸들러 ====================

/// 가입.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "가입 성공", body = RegisterResponse),
        (status = 409, description = "이미 가입된 이메일", body = ApiErrorResponse),
        (status = 422, description = "필수 입력 누락", body = ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<RegisterResponse>> {
    let Json(req) = payload.map_err(invalid_body)?;

    let user = state
        .authenticator
        .register(
            req.email.as_deref(),
            req.password.as_deref(),
            req.role.as_deref(),
        )
        .await?;

    info!(user_id = user.id, role = %user.role, "User registered");

    Ok(Json(RegisterResponse {
        message: "register successfully".to_string(),
        data: user.profile(),
    }))
}

async fn authenticate_and_issue(
    state: &AppState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(User, IssuedToken)> {
    let Json(req) = payload.map_err(invalid_body)?;
    let email = required(req.email.as_deref(), "email is required")?;
    let password = required(req.password.as_deref(), "password is required")?;

    let user = state.authenticator.authenticate(email, password).await?;
    let issued = state
        .issuer
        .issue(&user)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((user, issued))
}

/// 로그인.
///
/// 존재하지 않는 이메일과 틀린 비밀번호는 같은 401 응답입니다.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공, Set-Cookie 포함", body = LoginResponse),
        (status = 401, description = "자격 증명 불일치", body = ApiErrorResponse),
        (status = 422, description = "필수 입력 누락", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let (user, issued) = match authenticate_and_issue(&state, payload).await {
        Ok(ok) => ok,
        Err(e) => {
            let outcome = match &e {
                ApiError::Validation(_) => "validation",
                ApiError::InvalidCredentials => "invalid_credentials",
                _ => "unavailable",
            };
            record_login_attempt(outcome);
            if matches!(e, ApiError::InvalidCredentials) {
                warn!("Login failed: invalid credentials");
            }
            return Err(e);
        }
    };

    record_login_attempt("success");
    info!(user_id = user.id, "User logged in");

    let cookie = session_cookie(&state.cookie, &issued.token, issued.expires_at);
    let body = LoginResponse {
        message: "login successful".to_string(),
        exp: issued.expires_at.timestamp(),
        token: issued.token,
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// 로그아웃.
///
/// 쿠키만 지웁니다. 이미 발급된 토큰은 만료 시각까지 유효합니다.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "쿠키 만료", body = MessageResponse)
    )
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(SET_COOKIE, expired_cookie(&state.cookie))],
        Json(MessageResponse {
            message: "logout successful".to_string(),
        }),
    )
}

/// 현재 사용자.
///
/// 저장소를 조회하지 않고 토큰 Claims만 사용합니다.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "현재 사용자", body = MeResponse),
        (status = 401, description = "토큰 없음 또는 무효", body = ApiErrorResponse)
    )
)]
pub async fn me(AuthClaims(claims): AuthClaims) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: claims.id,
        email: claims.email,
        role: claims.role,
    })
}

/// 인증 라우터.
pub fn auth_router(gate: &AccessGate) -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route(
            "/me",
            get(me).route_layer(middleware::from_fn_with_state(
                gate.guard(RoleSet::any()),
                require_role,
            )),
        )
}
