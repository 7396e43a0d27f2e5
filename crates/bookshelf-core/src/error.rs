//! 기동 및 설정 단계의 에러 타입.
//!
//! 요청 처리 중의 에러는 API 크레이트의 컴포넌트별 에러가 담당합니다.

use thiserror::Error;

/// 부트스트랩 에러.
#[derive(Debug, Error)]
pub enum BookshelfError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 설정 로드 실패
    #[error("설정 로드 실패: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// 로깅 초기화 실패
    #[error("로깅 초기화 실패: {0}")]
    Logging(String),
}

/// 부트스트랩 작업을 위한 Result 타입.
pub type BookshelfResult<T> = Result<T, BookshelfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_error_converts() {
        let err: BookshelfError = config::ConfigError::NotFound("auth.jwt_secret".to_string()).into();
        assert!(matches!(err, BookshelfError::ConfigLoad(_)));
    }

    #[test]
    fn test_error_display() {
        let err = BookshelfError::Config("JWT signing secret is not set".to_string());
        assert!(err.to_string().contains("JWT signing secret is not set"));
    }
}
