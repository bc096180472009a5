//! 인증 주체(Principal)와 조회 저장소 추상화.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use super::Role;

/// 인증 주체.
///
/// 저장소에서 읽어온 그대로의 레코드로, 비밀번호 해시를 포함합니다.
/// 응답이나 보안 컨텍스트에는 [`PrincipalView`]만 내보냅니다.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    /// 저장된 비밀번호 해시 (설정되지 않았으면 `None`)
    pub password_hash: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn new(
        id: i64,
        email: impl Into<String>,
        password_hash: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash,
            role,
        }
    }

    /// 비밀번호 해시를 제외한 공개 정보.
    pub fn view(&self) -> PrincipalView {
        PrincipalView {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

// 해시가 로그로 새지 않도록 Debug를 직접 구현
impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "[REDACTED]"))
            .field("role", &self.role)
            .finish()
    }
}

/// 비밀번호 해시가 빠진 인증 주체 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PrincipalView {
    /// 사용자 ID
    pub id: i64,
    /// 이메일 (로그인 식별자)
    pub email: String,
    /// 역할
    pub role: Role,
}

/// 저장소 에러.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("저장소를 사용할 수 없습니다: {0}")]
    Unavailable(String),
    #[error("저장소 응답 시간 초과")]
    Timeout,
    #[error("잘못된 저장소 레코드: {0}")]
    InvalidRecord(String),
}

/// 이메일로 인증 주체를 조회하는 저장소.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// 이메일로 인증 주체 조회. 없으면 `Ok(None)`.
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_hash() {
        let principal = Principal::new(
            1,
            "admin@kazale.com",
            Some("$argon2id$v=19$secret".to_string()),
            Role::Admin,
        );
        let debug = format!("{:?}", principal);

        assert!(debug.contains("admin@kazale.com"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn test_view_omits_hash() {
        let principal = Principal::new(7, "user@kazale.com", Some("hash".to_string()), Role::User);
        let json = serde_json::to_value(principal.view()).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "user@kazale.com");
        assert_eq!(json["role"], "USER");
        assert!(json.get("password_hash").is_none());
    }
}
