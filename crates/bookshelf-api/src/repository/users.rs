//! 사용자 저장소.

use std::collections::HashMap;

use async_trait::async_trait;
use bookshelf_core::{NewUser, User};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::{map_unique_violation, RepositoryError, RepositoryResult};

/// 사용자 레코드 저장소.
///
/// 이메일 비교는 대소문자를 구분합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 한 명 조회.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// 사용자 생성. 이메일이 이미 있으면 [`RepositoryError::Duplicate`].
    async fn create(&self, new_user: NewUser) -> RepositoryResult<User>;
}

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// PostgreSQL 사용자 저장소.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> RepositoryResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, new_user.email.clone()))
    }
}

// ================================================================================================
// In-memory
// ================================================================================================

#[derive(Default)]
struct UserTable {
    last_id: i64,
    by_email: HashMap<String, User>,
}

/// 인메모리 사용자 저장소.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_email.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.table.read().await.by_email.get(email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> RepositoryResult<User> {
        let mut table = self.table.write().await;
        if table.by_email.contains_key(&new_user.email) {
            return Err(RepositoryError::Duplicate(new_user.email));
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
        };
        table.by_email.insert(user.email.clone(), user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("a@x.com")).await.unwrap();
        assert_eq!(created.id, 1);

        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@x.com")).await.unwrap();

        assert!(store.find_by_email("A@x.com").await.unwrap().is_none());
        // 대소문자만 다른 이메일은 별개 계정
        assert!(store.create(new_user("A@x.com")).await.is_ok());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@x.com")).await.unwrap();

        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(email) if email == "a@x.com"));
        assert_eq!(store.len().await, 1);
    }
}
