//! 인증 주체 조회 endpoint.
//!
//! - `GET /api/me` - 현재 인증된 사용자 (인증 필요)
//! - `GET /api/principals/{email}` - 이메일로 사용자 조회 (ADMIN 전용)
//!
//! 응답에는 비밀번호 해시가 포함되지 않습니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::warn;

use crate::auth::{AuthError, CurrentPrincipal, PrincipalView};
use crate::error::ApiResponse;
use crate::state::AppState;

/// 현재 사용자 조회.
///
/// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "principals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "현재 사용자", body = ApiResponse<PrincipalView>),
        (status = 401, description = "인증 필요", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<ApiResponse<PrincipalView>> {
    Json(ApiResponse::success(principal))
}

/// 이메일로 사용자 조회.
///
/// GET /api/principals/{email}
#[utoipa::path(
    get,
    path = "/api/principals/{email}",
    tag = "principals",
    security(("bearer_auth" = [])),
    params(("email" = String, Path, description = "사용자 이메일")),
    responses(
        (status = 200, description = "사용자 정보", body = ApiResponse<PrincipalView>),
        (status = 401, description = "인증 필요", body = crate::error::ApiErrorResponse),
        (status = 403, description = "ADMIN 권한 필요", body = crate::error::ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_principal(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<PrincipalView>>, AuthError> {
    let principal = state
        .auth
        .find_principal(&email)
        .await
        .inspect_err(|e| warn!(email = %email, error = %e, "Principal lookup failed"))?
        .ok_or_else(|| AuthError::PrincipalNotFound(email.clone()))?;

    Ok(Json(ApiResponse::success(principal.view())))
}

/// 인증 주체 라우터 생성 (`/api` 아래에 중첩).
pub fn principals_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(me))
        .route("/principals/{email}", get(get_principal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, SecurityContext};
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Extension,
    };
    use tower::ServiceExt;

    fn admin_view() -> PrincipalView {
        PrincipalView {
            id: 1,
            email: "admin@kazale.com".to_string(),
            role: Role::Admin,
        }
    }

    fn app(ctx: SecurityContext) -> Router {
        Router::new()
            .nest("/api", principals_router())
            .with_state(Arc::new(create_test_state()))
            .layer(Extension(ctx))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_me_returns_current_principal() {
        let (status, json) = get_json(
            app(SecurityContext::authenticated(admin_view())),
            "/api/me",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["email"], "admin@kazale.com");
        assert_eq!(json["data"]["role"], "ADMIN");
    }

    #[tokio::test]
    async fn test_me_anonymous_is_unauthorized() {
        let (status, json) = get_json(app(SecurityContext::anonymous()), "/api/me").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_get_principal_omits_hash() {
        let (status, json) = get_json(
            app(SecurityContext::authenticated(admin_view())),
            "/api/principals/usuario@kazale.com",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["role"], "USER");
        assert!(json["data"].get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[tokio::test]
    async fn test_get_principal_not_found() {
        let (status, json) = get_json(
            app(SecurityContext::authenticated(admin_view())),
            "/api/principals/ghost@kazale.com",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "PRINCIPAL_NOT_FOUND");
    }
}
