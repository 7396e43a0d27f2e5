//! # Bookshelf Core
//!
//! 북셸프 API 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자/도서 도메인 레코드
//! - 설정 관리 (파일 + 환경 변수)
//! - 로깅 인프라
//! - 부트스트랩 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
