//! JWT 발급 및 검증.
//!
//! 서명 알고리즘은 HS256 하나로 고정합니다. 검증 시 헤더의 알고리즘이
//! HS256이 아니면 서명을 확인하기 전에 거부합니다. `none`처럼
//! `jsonwebtoken`이 모르는 알고리즘 이름도 `WrongAlgorithm`입니다.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bookshelf_core::{User, MAX_TOKEN_TTL_HOURS, MIN_SECRET_LEN};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 발급과 검증에 사용하는 유일한 알고리즘.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// 토큰 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    pub id: i64,
    /// 사용자 이메일
    pub email: String,
    /// 사용자 역할
    pub role: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 사용자 레코드로부터 Claims 생성.
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// 현재 시각 기준 만료 여부. 만료 시각과 같으면 만료로 봅니다.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// 만료 시각.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// JWT 처리 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 서명 실패: {0}")]
    SigningFailure(String),
    #[error("잘못된 토큰 형식")]
    Malformed,
    #[error("토큰 서명이 유효하지 않습니다")]
    BadSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("허용되지 않은 서명 알고리즘")]
    WrongAlgorithm,
}

/// 발급된 토큰과 만료 시각.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn check_secret(secret: &SecretString) -> Result<&[u8], JwtError> {
    let bytes = secret.expose_secret().as_bytes();
    if bytes.len() < MIN_SECRET_LEN {
        return Err(JwtError::SigningFailure(format!(
            "signing key must be at least {} bytes",
            MIN_SECRET_LEN
        )));
    }
    Ok(bytes)
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// 첫 번째 세그먼트를 직접 디코딩해 `alg` 문자열을 읽습니다.
fn raw_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes)
        .ok()
        .map(|header| header.alg)
}

/// 토큰 발급기.
///
/// 서명 키와 유효 기간은 생성 시 주입되며 이후 변경되지 않습니다.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// 발급기 생성.
    ///
    /// 키가 비었거나 너무 짧으면, 또는 유효 기간이 0 이하이거나
    /// [`MAX_TOKEN_TTL_HOURS`]를 넘으면 `SigningFailure`.
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self, JwtError> {
        let bytes = check_secret(secret)?;
        if ttl <= Duration::zero() {
            return Err(JwtError::SigningFailure(
                "token lifetime must be positive".to_string(),
            ));
        }
        if ttl > Duration::hours(MAX_TOKEN_TTL_HOURS) {
            return Err(JwtError::SigningFailure(format!(
                "token lifetime must be at most {} hours",
                MAX_TOKEN_TTL_HOURS
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(bytes),
            ttl,
        })
    }

    /// 토큰 유효 기간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, JwtError> {
        self.issue_at(user, Utc::now())
    }

    /// 지정한 발급 시각으로 토큰 발급.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<IssuedToken, JwtError> {
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            JwtError::SigningFailure("token expiry is out of range".to_string())
        })?;
        let claims = Claims::for_user(user, issued_at, expires_at);

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailure(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

/// 토큰 검증기.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// 검증기 생성.
    pub fn new(secret: &SecretString) -> Result<Self, JwtError> {
        let bytes = check_secret(secret)?;

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        })
    }

    /// 토큰 검증 후 Claims 반환.
    ///
    /// 순서: 헤더 파싱 → 알고리즘 확인 → 서명 → 만료.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let header = match decode_header(token) {
            Ok(header) => header,
            Err(_) => {
                return Err(match raw_algorithm(token) {
                    Some(alg) if alg != "HS256" => JwtError::WrongAlgorithm,
                    _ => JwtError::Malformed,
                })
            }
        };
        if header.alg != TOKEN_ALGORITHM {
            return Err(JwtError::WrongAlgorithm);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::BadSignature,
                ErrorKind::InvalidAlgorithm => JwtError::WrongAlgorithm,
                _ => JwtError::Malformed,
            },
        )?;

        // 라이브러리는 exp == now를 통과시키므로 여기서 한 번 더 확인
        if token_data.claims.is_expired() {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const OTHER_SECRET: &str = "wrong-secret-key-for-testing-minimum-32-chars";

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn user() -> User {
        User {
            id: 42,
            email: "a@x.com".to_string(),
            password_hash: "unused".to_string(),
            role: "user".to_string(),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&secret(TEST_SECRET), Duration::hours(24)).unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&secret(TEST_SECRET)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let issued = issuer().issue(&user()).unwrap();
        assert!(!issued.token.is_empty());

        let claims = verifier().verify(&issued.token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_expired_token() {
        let issued_at = Utc::now() - Duration::hours(25);
        let issued = issuer().issue_at(&user(), issued_at).unwrap();

        assert_eq!(verifier().verify(&issued.token), Err(JwtError::Expired));
    }

    #[test]
    fn test_expiry_equal_to_now_is_expired() {
        let ttl = Duration::hours(24);
        let issued = issuer().issue_at(&user(), Utc::now() - ttl).unwrap();
        assert!(issued.expires_at <= Utc::now());

        assert_eq!(verifier().verify(&issued.token), Err(JwtError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let issued = issuer().issue(&user()).unwrap();
        let other = TokenVerifier::new(&secret(OTHER_SECRET)).unwrap();

        assert_eq!(other.verify(&issued.token), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_expired_and_wrong_secret_is_bad_signature() {
        let issued = issuer()
            .issue_at(&user(), Utc::now() - Duration::days(3))
            .unwrap();
        let other = TokenVerifier::new(&secret(OTHER_SECRET)).unwrap();

        assert_eq!(other.verify(&issued.token), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_other_hmac_algorithm_is_rejected() {
        let now = Utc::now();
        let claims = Claims::for_user(&user(), now, now + Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verifier().verify(&token), Err(JwtError::WrongAlgorithm));
    }

    #[test]
    fn test_unsigned_token_is_wrong_algorithm() {
        // {"alg":"none","typ":"JWT"}
        let header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        let payload = URL_SAFE_NO_PAD.encode(
            r#"{"id":1,"email":"root@x.com","role":"admin","iat":0,"exp":9999999999}"#,
        );

        let unsigned = format!("{}.{}.", header, payload);
        assert_eq!(verifier().verify(&unsigned), Err(JwtError::WrongAlgorithm));

        let signed = format!("{}.{}.c2lnbmF0dXJl", header, payload);
        assert_eq!(verifier().verify(&signed), Err(JwtError::WrongAlgorithm));
    }

    #[test]
    fn test_unknown_algorithm_name_is_wrong_algorithm() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS999","typ":"JWT"}"#);
        let token = format!("{}.eyJpZCI6MX0.c2ln", header);
        assert_eq!(verifier().verify(&token), Err(JwtError::WrongAlgorithm));
    }

    #[test]
    fn test_header_that_is_not_json_is_malformed() {
        let header = URL_SAFE_NO_PAD.encode("not json");
        let token = format!("{}.eyJpZCI6MX0.c2ln", header);
        assert_eq!(verifier().verify(&token), Err(JwtError::Malformed));
    }

    #[test]
    fn test_garbled_tokens_are_malformed() {
        let v = verifier();
        assert_eq!(v.verify(""), Err(JwtError::Malformed));
        assert_eq!(v.verify("not-a-token"), Err(JwtError::Malformed));
        assert_eq!(v.verify("invalid.token.here"), Err(JwtError::Malformed));

        let issued = issuer().issue(&user()).unwrap();
        let truncated = &issued.token[..issued.token.len() / 2];
        assert!(v.verify(truncated).is_err());
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let issued = issuer().issue(&user()).unwrap();
        let admin = User {
            role: "admin".to_string(),
            ..user()
        };
        let forged = TokenIssuer::new(&secret(OTHER_SECRET), Duration::hours(1))
            .unwrap()
            .issue(&admin)
            .unwrap();

        // 원본 헤더 + 위조 페이로드 + 원본 서명
        let original: Vec<&str> = issued.token.split('.').collect();
        let forged_parts: Vec<&str> = forged.token.split('.').collect();
        let spliced = format!("{}.{}.{}", original[0], forged_parts[1], original[2]);

        assert_eq!(verifier().verify(&spliced), Err(JwtError::BadSignature));
    }

    #[test]
    fn test_weak_secret_rejected() {
        assert!(matches!(
            TokenIssuer::new(&secret("short"), Duration::hours(1)),
            Err(JwtError::SigningFailure(_))
        ));
        assert!(matches!(
            TokenIssuer::new(&secret(""), Duration::hours(1)),
            Err(JwtError::SigningFailure(_))
        ));
        assert!(TokenVerifier::new(&secret("short")).is_err());
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        assert!(matches!(
            TokenIssuer::new(&secret(TEST_SECRET), Duration::zero()),
            Err(JwtError::SigningFailure(_))
        ));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        assert!(TokenIssuer::new(&secret(TEST_SECRET), Duration::hours(MAX_TOKEN_TTL_HOURS)).is_ok());
        assert!(matches!(
            TokenIssuer::new(&secret(TEST_SECRET), Duration::hours(1_000_000_000_000)),
            Err(JwtError::SigningFailure(_))
        ));
    }

    #[test]
    fn test_expiry_overflow_is_signing_failure() {
        let issued_at = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        assert!(matches!(
            issuer().issue_at(&user(), issued_at),
            Err(JwtError::SigningFailure(_))
        ));
    }
}
