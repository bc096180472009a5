//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clockin_core::{AuthConfig, Clock};
use tokio_util::sync::CancellationToken;

use crate::auth::{default_policy, AccessPolicy, AuthState, PrincipalStore, TokenService};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 인증 필터 상태 (토큰 서비스, 주체 저장소, 조회 제한 시간)
    pub auth: AuthState,

    /// 인가 가드 접근 정책
    pub policy: Arc<AccessPolicy>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,

    /// Graceful shutdown 토큰
    pub shutdown_token: CancellationToken,
}

impl AppState {
    /// 새 AppState 생성.
    ///
    /// # Arguments
    ///
    /// * `config` - 서명 키, 토큰 TTL, 조회 제한 시간
    /// * `principals` - 인증 주체 저장소
    /// * `clock` - 토큰 만료 판정에 사용할 시계
    pub fn new(
        config: &AuthConfig,
        principals: Arc<dyn PrincipalStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.now();
        let tokens = Arc::new(TokenService::new(config, clock));

        Self {
            auth: AuthState::new(tokens, principals, config.lookup_timeout()),
            policy: Arc::new(default_policy()),
            started_at,
            version: env!("CARGO_PKG_VERSION").to_string(),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 토큰 서비스.
    pub fn tokens(&self) -> &TokenService {
        &self.auth.tokens
    }

    /// 인증 주체 저장소.
    pub fn principals(&self) -> &Arc<dyn PrincipalStore> {
        &self.auth.principals
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (self.auth.tokens.now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태.
    pub async fn is_store_healthy(&self) -> bool {
        matches!(
            tokio::time::timeout(self.auth.lookup_timeout, self.auth.principals.ping()).await,
            Ok(Ok(()))
        )
    }
}

/// 테스트용 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 테스트용 비밀번호 (모든 테스트 사용자 공통).
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_PASSWORD: &str = "123456";

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 메모리 저장소와 수동 시계로 상태를 만듭니다.
/// `admin@kazale.com`(ADMIN)과 `usuario@kazale.com`(USER)이 등록되어 있습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with_clock(Arc::new(clockin_core::ManualClock::starting_now()))
}

/// 주어진 시계로 테스트용 AppState 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with_clock(clock: Arc<dyn Clock>) -> AppState {
    use crate::auth::{hash_password, Principal, Role};
    use crate::repository::InMemoryPrincipalStore;

    let hash = hash_password(TEST_PASSWORD).ok();
    let store = InMemoryPrincipalStore::with_principals(vec![
        Principal::new(1, "admin@kazale.com", hash.clone(), Role::Admin),
        Principal::new(2, "usuario@kazale.com", hash, Role::User),
    ]);

    AppState::new(
        &AuthConfig::new(TEST_JWT_SECRET, 604_800),
        Arc::new(store),
        clock,
    )
}
