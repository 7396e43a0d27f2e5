//! 비밀번호 해싱.
//!
//! Argon2id, 고정 작업 계수, PHC 문자열 형식.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::Lazy;

/// 메모리 비용 (KiB).
pub const MEMORY_COST_KIB: u32 = 19_456;
/// 반복 횟수.
pub const TIME_COST: u32 = 2;
/// 병렬도.
pub const PARALLELISM: u32 = 1;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패: {0}")]
    HashingFailed(String),
}

/// 작업 계수가 고정된 Argon2id 인스턴스.
fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 존재하지 않는 사용자 로그인 시 비교 대상으로 쓰는 해시.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("bookshelf-dummy-password").ok());

/// 비밀번호 해싱.
///
/// 솔트는 OS 난수원에서 매번 새로 생성하므로 같은 입력이라도 결과가 다릅니다.
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("secret123")?;
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 불일치, 잘못된 해시 형식 모두 `false`. 에러를 반환하지 않습니다.
/// 파라미터는 해시 문자열에 기록된 값을 사용합니다.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// 더미 해시를 미리 생성합니다.
///
/// 첫 번째 미등록 이메일 로그인이 해시 생성 비용까지 치르지 않도록 기동 시 호출합니다.
pub fn prepare_dummy_hash() -> bool {
    Lazy::force(&DUMMY_HASH).is_some()
}

#[cfg(test)]
pub(super) fn dummy_hash_ready() -> bool {
    Lazy::get(&DUMMY_HASH).is_some()
}

/// 더미 해시에 대해 검증을 수행하고 버립니다.
///
/// 사용자가 없는 경우에도 비밀번호 불일치와 비슷한 시간이 걸리도록 합니다.
pub fn burn_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
