//! 출퇴근 기록 백엔드 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 상태 없는 JWT 인증 (로그인, 토큰 갱신)
//! - 경로/역할 기반 인가 가드
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 권한 관리
//! - [`repository`]: 인증 주체 저장소 (PostgreSQL, 메모리)
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    hash_password, verify_password, AccessPolicy, AuthError, Claims, CurrentPrincipal, Principal,
    PrincipalStore, Role, SecurityContext, TokenError, TokenService,
};
pub use error::{ApiErrorResponse, ApiResponse, EnvelopeResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{InMemoryPrincipalStore, PgPrincipalStore};
pub use routes::{create_api_router, create_app, with_security};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with_clock, TEST_JWT_SECRET, TEST_PASSWORD};
