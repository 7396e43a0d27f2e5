//! 영속성 계층.
//!
//! 핸들러와 인증 코어는 트레이트만 알고, 구현은 시작 시점에 결정됩니다.
//! - [`PgUserStore`], [`PgBookStore`]: PostgreSQL (`sqlx`)
//! - [`MemoryUserStore`], [`MemoryBookStore`]: DB URL이 없을 때와 테스트용

pub mod books;
pub mod users;

pub use books::{BookStore, MemoryBookStore, PgBookStore};
pub use users::{MemoryUserStore, PgUserStore, UserStore};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// 고유 제약 위반
    #[error("이미 존재하는 레코드: {0}")]
    Duplicate(String),

    /// 그 외 데이터베이스 오류
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
}

/// 저장소 Result 타입 별칭.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// 고유 제약 위반이면 `Duplicate`, 아니면 `Database`로 변환.
pub(crate) fn map_unique_violation(err: sqlx::Error, what: impl Into<String>) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Duplicate(what.into())
        }
        _ => RepositoryError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_not_duplicate() {
        let err = map_unique_violation(sqlx::Error::RowNotFound, "a@x.com");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
