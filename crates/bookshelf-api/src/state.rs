//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! `Arc<AppState>`로 라우터에 주입됩니다. 서명 키는 생성 시 한 번만 읽고
//! 이후에는 발급기/검증기 내부에만 존재합니다.

use std::sync::Arc;

use bookshelf_core::{AuthConfig, BookshelfError, BookshelfResult, CookieConfig};
use chrono::Duration;
use sqlx::PgPool;

use crate::auth::{AccessGate, Authenticator, TokenIssuer, TokenVerifier};
use crate::repository::{BookStore, UserStore};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 로그인/가입 처리
    pub authenticator: Authenticator,

    /// 토큰 발급기
    pub issuer: Arc<TokenIssuer>,

    /// 보호된 라우트용 게이트
    pub gate: AccessGate,

    /// 도서 저장소
    pub books: Arc<dyn BookStore>,

    /// 로그인 쿠키 속성
    pub cookie: CookieConfig,

    /// 데이터베이스 연결 풀 (인메모리 모드에서는 None)
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인증 설정과 저장소로 상태 생성.
    ///
    /// 서명 키가 없거나 짧으면 에러이며, 호출 측은 기동을 중단해야 합니다.
    pub fn new(
        auth: &AuthConfig,
        users: Arc<dyn UserStore>,
        books: Arc<dyn BookStore>,
    ) -> BookshelfResult<Self> {
        let secret = auth.signing_secret()?;
        let ttl = Duration::try_hours(auth.token_ttl_hours).ok_or_else(|| {
            BookshelfError::Config(format!(
                "auth.token_ttl_hours is out of range: {}",
                auth.token_ttl_hours
            ))
        })?;

        let issuer = TokenIssuer::new(secret, ttl)
            .map_err(|e| BookshelfError::Config(e.to_string()))?;
        let verifier = TokenVerifier::new(secret)
            .map_err(|e| BookshelfError::Config(e.to_string()))?;

        let gate = AccessGate::new(Arc::new(verifier), auth.carrier, &auth.cookie.name);

        Ok(Self {
            authenticator: Authenticator::new(users),
            issuer: Arc::new(issuer),
            gate,
            books,
            cookie: auth.cookie.clone(),
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 데이터베이스 풀 연결.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// DB 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }
}

/// 테스트용 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 인메모리 저장소와 테스트 키로 구성된 상태.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with(AuthConfig {
        jwt_secret: Some(secrecy::SecretString::from(TEST_JWT_SECRET.to_string())),
        ..AuthConfig::default()
    })
}

/// 인증 설정을 지정한 테스트 상태.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with(auth: AuthConfig) -> AppState {
    use crate::repository::{MemoryBookStore, MemoryUserStore};

    AppState::new(
        &auth,
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryBookStore::new()),
    )
    .expect("test auth config must be valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryBookStore, MemoryUserStore};

    #[test]
    fn test_missing_secret_is_fatal() {
        let result = AppState::new(
            &AuthConfig::default(),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryBookStore::new()),
        );
        assert!(matches!(result, Err(BookshelfError::Config(_))));
    }

    #[test]
    fn test_out_of_range_ttl_is_fatal() {
        for hours in [i64::MAX, 1_000_000] {
            let auth = AuthConfig {
                jwt_secret: Some(secrecy::SecretString::from(TEST_JWT_SECRET.to_string())),
                token_ttl_hours: hours,
                ..AuthConfig::default()
            };
            let result = AppState::new(
                &auth,
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemoryBookStore::new()),
            );
            assert!(matches!(result, Err(BookshelfError::Config(_))), "hours={}", hours);
        }
    }

    #[tokio::test]
    async fn test_in_memory_state_has_no_db() {
        let state = create_test_state();
        assert!(state.db_pool.is_none());
        assert!(!state.is_db_healthy().await);
        assert_eq!(state.issuer.ttl(), Duration::hours(24));
    }
}
