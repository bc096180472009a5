//! 역할 기반 접근 제어 (RBAC).
//!
//! 출퇴근 시스템의 사용자 역할 정의.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 사용자 역할.
///
/// 역할 간 상하 관계는 없습니다. 접근 규칙이 허용 역할을 직접 나열합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// 관리자 - 기록 삭제, 사용자 조회 가능
    Admin,
    /// 일반 직원
    User,
}

impl Role {
    /// 문자열에서 역할 파싱.
    ///
    /// `ADMIN`/`USER` 외에 저장소에 남아 있는 `ROLE_` 접두 형식도 받아들입니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" | "ROLE_ADMIN" => Some(Role::Admin),
            "USER" | "USUARIO" | "ROLE_USER" | "ROLE_USUARIO" => Some(Role::User),
            _ => None,
        }
    }

    /// 역할 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// 권한 문자열 (`ROLE_` 접두).
    pub fn authority(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::User => "ROLE_USUARIO",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
