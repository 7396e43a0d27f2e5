//! 인증 및 권한 관리.
//!
//! - [`password`]: Argon2id 비밀번호 해싱
//! - [`credentials`]: 로그인 자격 증명 확인 및 가입
//! - [`jwt`]: 토큰 발급/검증
//! - [`roles`]: 라우트별 허용 역할
//! - [`middleware`]: 접근 제어 게이트

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;

pub use credentials::{required, AuthError, Authenticator};
pub use jwt::{Claims, IssuedToken, JwtError, TokenIssuer, TokenVerifier, TOKEN_ALGORITHM};
pub use middleware::{parse_cookie, require_role, AccessGate, AuthClaims, AuthGateError, RouteGuard};
pub use password::{
    burn_verification, hash_password, prepare_dummy_hash, verify_password, PasswordError,
};
pub use roles::RoleSet;
