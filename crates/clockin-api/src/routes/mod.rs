//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth` - 로그인 (토큰 발급)
//! - `/auth/refresh` - 토큰 갱신
//! - `/api/me` - 현재 사용자
//! - `/api/principals/{email}` - 사용자 조회 (ADMIN)

pub mod auth;
pub mod health;
pub mod principals;

pub use auth::{auth_router, LoginRequest, TokenResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use principals::principals_router;

use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;

use crate::auth::{authentication_filter, authorization_guard};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 보안 레이어는 포함하지 않습니다. [`with_security`]로 감싸서 사용합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router())
        .nest("/api", principals_router())
}

/// 라우터에 인증 필터와 인가 가드를 적용합니다.
///
/// 요청은 필터 → 가드 → 핸들러 순으로 처리됩니다.
/// 매칭되지 않는 경로도 가드를 거치므로 익명 요청은 404 대신 401을 받습니다.
pub fn with_security(router: Router, state: &AppState) -> Router {
    router
        .layer(from_fn_with_state(
            state.policy.clone(),
            authorization_guard,
        ))
        .layer(from_fn_with_state(
            state.auth.clone(),
            authentication_filter,
        ))
}

/// 보안 레이어가 적용된 애플리케이션 라우터.
pub fn create_app(state: Arc<AppState>) -> Router {
    let router = create_api_router().with_state(state.clone());
    with_security(router, &state)
}
