//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수 순서로 덮어씁니다.
//! 환경 변수는 `BOOKSHELF__SECTION__KEY` 형식을 사용하며,
//! 관례적인 `JWT_SECRET`, `DATABASE_URL`, `API_HOST`, `API_PORT`도 인식합니다.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::{BookshelfError, BookshelfResult};

/// 서명 키 최소 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// 토큰 유효 기간 상한 (시간). 1년.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전역 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 인메모리 저장소로 동작
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

/// 보호된 라우트가 토큰을 받는 위치.
///
/// 배포 단위로 하나만 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCarrier {
    /// `Authorization: Bearer <token>` 헤더
    #[default]
    Bearer,
    /// 이름이 지정된 쿠키 (`auth.cookie.name`)
    Cookie,
}

/// 쿠키 SameSite 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    /// `Set-Cookie` 속성 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// 세션 쿠키 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// 쿠키 이름
    pub name: String,
    /// HTTPS 전용 여부
    pub secure: bool,
    /// 스크립트 접근 차단 여부
    pub http_only: bool,
    /// SameSite 정책
    #[serde(default)]
    pub same_site: SameSite,
    /// 쿠키 도메인 (선택)
    #[serde(default)]
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "jwt".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            domain: None,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 서명 키
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub jwt_secret: Option<SecretString>,
    /// 토큰 유효 기간 (시간)
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// 보호된 라우트의 토큰 전달 방식
    #[serde(default)]
    pub carrier: TokenCarrier,
    /// 세션 쿠키 설정
    #[serde(default)]
    pub cookie: CookieConfig,
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            carrier: TokenCarrier::default(),
            cookie: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// 검증된 서명 키 반환.
    ///
    /// 키가 없거나 [`MIN_SECRET_LEN`]보다 짧으면 에러입니다.
    pub fn signing_secret(&self) -> BookshelfResult<&SecretString> {
        let secret = self
            .jwt_secret
            .as_ref()
            .ok_or_else(|| BookshelfError::Config("JWT signing secret is not set".to_string()))?;

        let len = secret.expose_secret().len();
        if len < MIN_SECRET_LEN {
            return Err(BookshelfError::Config(format!(
                "JWT signing secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN, len
            )));
        }

        Ok(secret)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "bookshelf_api=info,tower_http=info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일은 없어도 됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> BookshelfResult<Self> {
        let builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("BOOKSHELF")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("API_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("API_PORT").ok().and_then(|p| p.parse::<i64>().ok()),
            )?;

        Ok(builder.build()?.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> BookshelfResult<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// 기동 전에 반드시 충족되어야 하는 조건 확인.
    pub fn validate(&self) -> BookshelfResult<()> {
        self.auth.signing_secret()?;

        if self.auth.token_ttl_hours <= 0 {
            return Err(BookshelfError::Config(format!(
                "auth.token_ttl_hours must be positive, got {}",
                self.auth.token_ttl_hours
            )));
        }

        if self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(BookshelfError::Config(format!(
                "auth.token_ttl_hours must be at most {}, got {}",
                MAX_TOKEN_TTL_HOURS, self.auth.token_ttl_hours
            )));
        }

        if self.auth.cookie.same_site == SameSite::None && !self.auth.cookie.secure {
            return Err(BookshelfError::Config(
                "SameSite=None cookies must also be Secure".to_string(),
            ));
        }

        Ok(())
    }
}
