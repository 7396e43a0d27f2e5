//! 역할 기반 접근 제어.
//!
//! 역할은 사용자 레코드에 저장된 문자열 그대로 비교합니다 (대소문자 구분).
//! 라우트마다 허용 역할 집합을 선언합니다.

use std::collections::BTreeSet;

/// 관리자 역할.
pub const ADMIN: &str = "admin";
/// 일반 사용자 역할.
pub const USER: &str = "user";

/// 라우트가 허용하는 역할 집합.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSet {
    /// 인증만 되면 어떤 역할이든 허용
    AnyAuthenticated,
    /// 나열된 역할 중 하나와 정확히 일치해야 허용
    Only(BTreeSet<String>),
}

impl RoleSet {
    /// 인증된 모든 역할 허용.
    pub fn any() -> Self {
        RoleSet::AnyAuthenticated
    }

    /// 지정한 역할만 허용.
    ///
    /// 빈 목록은 아무 것도 허용하지 않습니다.
    pub fn only<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleSet::Only(roles.into_iter().map(Into::into).collect())
    }

    /// 관리자 전용.
    pub fn admin() -> Self {
        Self::only([ADMIN])
    }

    /// 역할이 허용되는지 확인.
    pub fn permits(&self, role: &str) -> bool {
        match self {
            RoleSet::AnyAuthenticated => true,
            RoleSet::Only(roles) => roles.contains(role),
        }
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleSet::AnyAuthenticated => write!(f, "*"),
            RoleSet::Only(roles) => {
                let joined: Vec<&str> = roles.iter().map(String::as_str).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_only() {
        let set = RoleSet::admin();
        assert!(set.permits("admin"));
        assert!(!set.permits("user"));
        assert!(!set.permits("Admin"));
        assert!(!set.permits(""));
    }

    #[test]
    fn test_multiple_roles() {
        let set = RoleSet::only(["admin", "editor"]);
        assert!(set.permits("admin"));
        assert!(set.permits("editor"));
        assert!(!set.permits(USER));
    }

    #[test]
    fn test_any_authenticated() {
        assert!(RoleSet::any().permits("whatever"));
    }

    #[test]
    fn test_empty_set_permits_nothing() {
        let set = RoleSet::only(Vec::<String>::new());
        assert!(!set.permits(ADMIN));
    }

    #[test]
    fn test_display() {
        assert_eq!(RoleSet::only(["user", "admin"]).to_string(), "admin,user");
        assert_eq!(RoleSet::any().to_string(), "*");
    }
}
