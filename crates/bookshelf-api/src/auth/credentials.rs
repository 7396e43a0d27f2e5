//! 자격 증명 확인 및 가입.
//!
//! 로그인 실패는 "사용자 없음"과 "비밀번호 불일치"를 구분하지 않습니다.
//! 두 경로 모두 Argon2 검증을 한 번 수행하여 응답 시간 차이를 줄입니다.

use std::sync::Arc;

use bookshelf_core::{NewUser, User};
use tracing::{debug, warn};

use super::password::{burn_verification, hash_password, prepare_dummy_hash, verify_password};
use crate::repository::{RepositoryError, UserStore};

/// 인증 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// 필수 입력 누락
    #[error("{0}")]
    Validation(&'static str),

    /// 이메일 또는 비밀번호 불일치
    #[error("invalid credentials")]
    InvalidCredentials,

    /// 이미 가입된 이메일
    #[error("email already registered")]
    Conflict,

    /// 저장소 또는 해싱 장애
    #[error("authentication unavailable: {0}")]
    Unavailable(String),
}

/// 필수 문자열 입력 확인. 없거나 비어 있으면 `Validation`.
pub fn required<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str, AuthError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::Validation(message)),
    }
}

/// 자격 증명 확인기.
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        if !prepare_dummy_hash() {
            warn!("Dummy password hash unavailable, unknown-user logins skip verification");
        }
        Self { users }
    }

    /// 이메일과 비밀번호로 사용자 확인.
    ///
    /// 입력이 비어 있으면 조회 전에 `Validation`을 반환합니다.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = required(Some(email), "email is required")?;
        let password = required(Some(password), "password is required")?.to_owned();

        let found = self.users.find_by_email(email).await.map_err(|e| {
            warn!(error = %e, "User lookup failed");
            AuthError::Unavailable(e.to_string())
        })?;

        let Some(user) = found else {
            run_blocking(move || burn_verification(&password)).await?;
            debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let matched = run_blocking(move || verify_password(&password, &stored_hash)).await?;
        if !matched {
            debug!(user_id = user.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// 새 사용자 가입.
    ///
    /// 입력 확인 순서는 email → password → role 입니다.
    pub async fn register(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        role: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = required(email, "email is required")?;
        let password = required(password, "password is required")?.to_owned();
        let role = required(role, "role is required")?;

        let password_hash = run_blocking(move || hash_password(&password))
            .await?
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let new_user = NewUser {
            email: email.to_string(),
            password_hash,
            role: role.to_string(),
        };

        self.users.create(new_user).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => AuthError::Conflict,
            other => {
                warn!(error = %other, "User insert failed");
                AuthError::Unavailable(other.to_string())
            }
        })
    }
}

/// Argon2 연산을 블로킹 스레드 풀에서 실행.
async fn run_blocking<F, T>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Unavailable(format!("blocking task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryUserStore, RepositoryResult};
    use async_trait::async_trait;

    /// 항상 실패하는 저장소.
    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn find_by_email(&self, _email: &str) -> RepositoryResult<Option<User>> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn create(&self, _new_user: NewUser) -> RepositoryResult<User> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    async fn authenticator_with_user() -> Authenticator {
        let auth = Authenticator::new(Arc::new(MemoryUserStore::new()));
        auth.register(Some("a@x.com"), Some("secret123"), Some("user"))
            .await
            .unwrap();
        auth
    }

    #[test]
    fn test_new_prepares_dummy_hash() {
        let _auth = Authenticator::new(Arc::new(MemoryUserStore::new()));
        assert!(crate::auth::password::dummy_hash_ready());
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some("x"), "m"), Ok("x"));
        assert_eq!(required(Some(""), "m"), Err(AuthError::Validation("m")));
        assert_eq!(required(None, "m"), Err(AuthError::Validation("m")));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let store = Arc::new(MemoryUserStore::new());
        let auth = Authenticator::new(store.clone());

        let user = auth
            .register(Some("a@x.com"), Some("secret123"), Some("user"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "secret123");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let auth = Authenticator::new(Arc::new(MemoryUserStore::new()));

        let err = auth.register(None, None, None).await.unwrap_err();
        assert_eq!(err, AuthError::Validation("email is required"));

        let err = auth.register(Some("a@x.com"), Some(""), None).await.unwrap_err();
        assert_eq!(err, AuthError::Validation("password is required"));

        let err = auth
            .register(Some("a@x.com"), Some("pw"), Some(""))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Validation("role is required"));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let auth = authenticator_with_user().await;
        let err = auth
            .register(Some("a@x.com"), Some("other"), Some("admin"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Conflict);
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let auth = authenticator_with_user().await;
        let user = auth.authenticate("a@x.com", "secret123").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, "user");
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_identical() {
        let auth = authenticator_with_user().await;

        let unknown = auth.authenticate("b@x.com", "secret123").await.unwrap_err();
        let wrong = auth.authenticate("a@x.com", "secret124").await.unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let auth = authenticator_with_user().await;
        let err = auth.authenticate("A@X.COM", "secret123").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_lookup() {
        // 저장소가 고장나 있어도 입력 검증이 먼저
        let auth = Authenticator::new(Arc::new(BrokenStore));
        assert_eq!(
            auth.authenticate("", "pw").await.unwrap_err(),
            AuthError::Validation("email is required")
        );
        assert_eq!(
            auth.authenticate("a@x.com", "").await.unwrap_err(),
            AuthError::Validation("password is required")
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let auth = Authenticator::new(Arc::new(BrokenStore));
        let err = auth.authenticate("a@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));

        let err = auth
            .register(Some("a@x.com"), Some("pw"), Some("user"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }
}
