//! 도메인 레코드.
//!
//! 영속성 계층이 소유하는 사용자(Identity)와 도서 레코드입니다.
//! 인증 코어는 사용자 레코드를 읽기만 합니다.

use serde::{Deserialize, Serialize};

/// 저장된 사용자.
///
/// `password_hash`는 PHC 문자열이며 응답으로 직렬화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct User {
    /// 사용자 ID
    pub id: i64,
    /// 이메일 (대소문자 구분, 고유)
    pub email: String,
    /// 비밀번호 해시
    pub password_hash: String,
    /// 역할 ("user", "admin" 등)
    pub role: String,
}

impl User {
    /// 공개 가능한 필드만 추출.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// 저장 전 사용자 (비밀번호는 이미 해싱된 상태).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// 외부로 노출되는 사용자 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub role: String,
}

/// 도서 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Book {
    pub id: i64,
    #[cfg_attr(feature = "sqlx-support", sqlx(default))]
    pub author: Option<String>,
    #[cfg_attr(feature = "sqlx-support", sqlx(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "sqlx-support", sqlx(default))]
    pub publisher: Option<String>,
}

/// 새 도서 입력.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewBook {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
}
