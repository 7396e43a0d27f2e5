//! 접근 제어 게이트.
//!
//! 보호된 라우트마다 허용 역할 집합([`RoleSet`])을 가진 [`RouteGuard`]를
//! `axum::middleware::from_fn_with_state`로 붙입니다. 통과한 요청에는
//! 검증된 [`Claims`]가 extension으로 들어가며, 핸들러는 [`AuthClaims`]로 꺼냅니다.
//!
//! ```rust,ignore
//! let admin_only = Router::new()
//!     .route("/", get(list_books))
//!     .route_layer(middleware::from_fn_with_state(
//!         gate.guard(RoleSet::admin()),
//!         require_role,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_core::TokenCarrier;
use tracing::warn;

use super::{Claims, JwtError, RoleSet, TokenVerifier};
use crate::error::ApiErrorResponse;
use crate::metrics::record_gate_decision;

/// 게이트 거부 사유.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthGateError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("권한이 부족합니다")]
    InsufficientPermission,
}

impl AuthGateError {
    /// 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthGateError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            AuthGateError::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "INVALID_AUTH_HEADER"),
            AuthGateError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthGateError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthGateError::InsufficientPermission => {
                (StatusCode::FORBIDDEN, "INSUFFICIENT_PERMISSION")
            }
        }
    }

    /// 유효한 토큰이지만 역할이 맞지 않는 경우.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthGateError::InsufficientPermission)
    }
}

impl From<JwtError> for AuthGateError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthGateError::TokenExpired,
            _ => AuthGateError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthGateError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        (status, Json(ApiErrorResponse::new(code, self.to_string()))).into_response()
    }
}

/// `Cookie` 헤더에서 이름이 일치하는 첫 번째 값.
pub fn parse_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// 토큰 추출, 검증, 역할 확인을 수행하는 게이트.
///
/// 검증기 외에 공유 상태가 없으므로 요청 간에 자유롭게 복제해 씁니다.
#[derive(Clone)]
pub struct AccessGate {
    verifier: Arc<TokenVerifier>,
    carrier: TokenCarrier,
    cookie_name: Arc<str>,
}

impl AccessGate {
    pub fn new(verifier: Arc<TokenVerifier>, carrier: TokenCarrier, cookie_name: &str) -> Self {
        Self {
            verifier,
            carrier,
            cookie_name: Arc::from(cookie_name),
        }
    }

    pub fn carrier(&self) -> TokenCarrier {
        self.carrier
    }

    /// 설정된 전달 방식에서 토큰 문자열 추출.
    pub fn extract_token<'a>(&self, headers: &'a HeaderMap) -> Result<&'a str, AuthGateError> {
        match self.carrier {
            TokenCarrier::Bearer => {
                let value = headers
                    .get(AUTHORIZATION)
                    .ok_or(AuthGateError::MissingToken)?
                    .to_str()
                    .map_err(|_| AuthGateError::InvalidAuthHeader)?;

                let token = value
                    .strip_prefix("Bearer ")
                    .map(str::trim)
                    .ok_or(AuthGateError::InvalidAuthHeader)?;

                if token.is_empty() {
                    return Err(AuthGateError::InvalidAuthHeader);
                }
                Ok(token)
            }
            TokenCarrier::Cookie => parse_cookie(headers, &self.cookie_name)
                .filter(|v| !v.is_empty())
                .ok_or(AuthGateError::MissingToken),
        }
    }

    /// 요청 허용 여부 판정.
    ///
    /// 토큰 없음/무효/만료는 401 계열, 역할 불일치는 403.
    pub fn authorize(&self, headers: &HeaderMap, allowed: &RoleSet) -> Result<Claims, AuthGateError> {
        let token = self.extract_token(headers)?;
        let claims = self.verifier.verify(token)?;

        if !allowed.permits(&claims.role) {
            return Err(AuthGateError::InsufficientPermission);
        }

        Ok(claims)
    }

    /// 허용 역할 집합을 묶어 라우트 가드 생성.
    pub fn guard(&self, allowed: RoleSet) -> RouteGuard {
        RouteGuard {
            gate: self.clone(),
            allowed,
        }
    }
}

/// 라우트 하나에 적용되는 게이트와 허용 역할.
#[derive(Clone)]
pub struct RouteGuard {
    gate: AccessGate,
    allowed: RoleSet,
}

/// 역할 확인 미들웨어.
///
/// `from_fn_with_state(gate.guard(..), require_role)`로 사용합니다.
pub async fn require_role(
    State(guard): State<RouteGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthGateError> {
    match guard.gate.authorize(request.headers(), &guard.allowed) {
        Ok(claims) => {
            record_gate_decision("allowed");
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            let decision = if e.is_forbidden() { "forbidden" } else { "unauthorized" };
            record_gate_decision(decision);
            warn!(
                path = %request.uri().path(),
                allowed = %guard.allowed,
                reason = %e,
                "Access denied"
            );
            Err(e)
        }
    }
}

/// 게이트를 통과한 요청의 Claims 추출기.
///
/// 게이트가 없는 라우트에서 쓰면 항상 401입니다.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AuthGateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or(AuthGateError::MissingToken)
    }
}
