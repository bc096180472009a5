//! Principal Repository
//!
//! 로그인 식별자(이메일)로 인증 주체를 조회합니다.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use crate::auth::{Principal, PrincipalStore, Role, StoreError};

// ================================================================================================
// PostgreSQL
// ================================================================================================

/// `funcionario` 테이블 레코드
#[derive(Debug, FromRow)]
struct FuncionarioRow {
    id: i64,
    email: String,
    #[sqlx(default)]
    senha: Option<String>,
    perfil: String,
}

impl TryFrom<FuncionarioRow> for Principal {
    type Error = StoreError;

    fn try_from(row: FuncionarioRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.perfil).ok_or_else(|| {
            StoreError::InvalidRecord(format!("알 수 없는 역할: {}", row.perfil))
        })?;
        Ok(Principal::new(row.id, row.email, row.senha, role))
    }
}

/// PostgreSQL 기반 인증 주체 저장소.
#[derive(Debug, Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, FuncionarioRow>(
            r#"
            SELECT id, email, senha, perfil
            FROM funcionario
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        row.map(Principal::try_from).transpose().inspect_err(|e| {
            warn!(email = %email, error = %e, "Stored principal could not be mapped");
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

// ================================================================================================
// In-memory
// ================================================================================================

/// 메모리 기반 인증 주체 저장소.
///
/// 데이터베이스 없이 실행하는 개발 환경과 테스트에서 사용합니다.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    principals: RwLock<HashMap<String, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 주체들로 채운 저장소.
    pub fn with_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        let store = Self::new();
        for principal in principals {
            store.insert(principal);
        }
        store
    }

    /// 주체 추가 (같은 이메일이 있으면 교체).
    pub fn insert(&self, principal: Principal) {
        let mut principals = self.principals.write().unwrap_or_else(|e| e.into_inner());
        principals.insert(principal.email.clone(), principal);
    }

    pub fn len(&self) -> usize {
        self.principals
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let principals = self.principals.read().unwrap_or_else(|e| e.into_inner());
        Ok(principals.get(email).cloned())
    }
}
