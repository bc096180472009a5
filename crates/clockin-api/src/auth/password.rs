//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱 및 검증.
//! 평문과 해시는 로그에 남기지 않습니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 사용자가 없거나 해시가 없을 때 대신 검증하는 해시.
///
/// 기본 파라미터의 올바른 PHC 문자열이지만 어떤 비밀번호와도 일치하지 않습니다.
/// 존재하는 계정과 같은 비용을 치르게 하여 응답 시간으로 계정 존재 여부가 드러나지 않게 합니다.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$tvU13awfRTPbLSi7RVAaow$asEUs56250TJ3d0IGBjTmjSQqoO5yfmHWnMd8sDfhFQ";

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하여 비밀번호를 해싱합니다.
/// 솔트는 매번 새로 생성되므로 같은 입력도 다른 해시를 만듭니다.
/// 빈 문자열은 해싱하지 않고 그대로 돌려줍니다.
///
/// # Arguments
///
/// * `password` - 해싱할 평문 비밀번호
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함)
///
/// # Example
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Ok(String::new());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 값이 없을 수도 있는 비밀번호 해싱.
///
/// `None`은 `None`으로, 빈 문자열은 빈 문자열로 통과시킵니다.
pub fn hash_optional_password(password: Option<&str>) -> Result<Option<String>, PasswordError> {
    password.map(hash_password).transpose()
}

/// 비밀번호 검증.
///
/// 저장된 해시와 입력된 비밀번호를 비교합니다.
/// 해시 형식이 잘못된 경우에도 에러 대신 `false`를 반환합니다.
///
/// # Arguments
///
/// * `password` - 검증할 평문 비밀번호
/// * `hash` - 저장된 PHC 형식 해시
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
