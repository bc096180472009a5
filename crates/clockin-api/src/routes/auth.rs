//! 인증 endpoint.
//!
//! - `POST /auth` - 이메일/비밀번호로 토큰 발급
//! - `POST /auth/refresh` - 유효한 토큰으로 새 토큰 발급

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{
    credential_from_headers, verify_password, AuthError, Principal, BEARER_PREFIX,
    DUMMY_PASSWORD_HASH,
};
use crate::error::{ApiResponse, EnvelopeResult};
use crate::metrics::{record_login, record_token_refresh};
use crate::state::AppState;

// ==================== 요청/응답 타입 ====================

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// 로그인 이메일
    #[serde(default)]
    #[validate(
        length(min = 1, message = "이메일은 비어 있을 수 없습니다"),
        email(message = "유효하지 않은 이메일입니다")
    )]
    pub email: String,

    /// 비밀번호 (`senha`도 허용)
    #[serde(default, alias = "senha")]
    #[validate(length(min = 1, message = "비밀번호는 비어 있을 수 없습니다"))]
    pub password: String,
}

/// 토큰 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// 서명된 토큰
    pub token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 유효 기간 (초)
    pub expires_in: i64,
}

impl TokenResponse {
    fn bearer(token: String, expires_in: i64) -> Self {
        Self {
            token,
            token_type: BEARER_PREFIX.trim_end().to_string(),
            expires_in,
        }
    }
}

fn failure<T>(status: StatusCode, errors: Vec<String>) -> (StatusCode, Json<ApiResponse<T>>) {
    (status, Json(ApiResponse::failure(errors)))
}

fn auth_failure<T>(err: &AuthError) -> (StatusCode, Json<ApiResponse<T>>) {
    failure(err.status_code(), vec![err.public_message()])
}

fn validation_messages(request: &LoginRequest) -> Vec<String> {
    let Err(errors) = request.validate() else {
        return Vec::new();
    };

    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect();
    messages.sort();
    messages
}

// ==================== 핸들러 ====================

/// 이메일/비밀번호 확인.
///
/// 사용자가 없거나, 비밀번호가 설정되지 않았거나, 틀린 경우를 구분하지 않습니다.
async fn verify_credentials(
    state: &AppState,
    email: &str,
    password: String,
) -> Result<Principal, AuthError> {
    let principal = state.auth.find_principal(email).await?;
    let stored_hash = principal
        .as_ref()
        .and_then(|p| p.password_hash.clone())
        .filter(|h| !h.is_empty());
    let has_hash = stored_hash.is_some();
    // 검증할 해시가 없어도 같은 비용의 Argon2 검증을 수행
    let hash = stored_hash.unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());

    // Argon2 검증은 CPU 작업이므로 블로킹 스레드에서 수행
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    match principal {
        Some(principal) if has_hash && matches => Ok(principal),
        _ => Err(AuthError::InvalidCredentials),
    }
}

/// 로그인.
///
/// POST /auth
#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급 성공", body = ApiResponse<TokenResponse>),
        (status = 400, description = "요청 형식 오류", body = ApiResponse<TokenResponse>),
        (status = 401, description = "이메일 또는 비밀번호 불일치", body = ApiResponse<TokenResponse>),
        (status = 503, description = "인증 저장소 사용 불가", body = ApiResponse<TokenResponse>)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> EnvelopeResult<TokenResponse> {
    let Json(request) = payload.map_err(|rejection| {
        record_login("invalid_request");
        failure(StatusCode::BAD_REQUEST, vec![rejection.body_text()])
    })?;

    let messages = validation_messages(&request);
    if !messages.is_empty() {
        record_login("invalid_request");
        return Err(failure(StatusCode::BAD_REQUEST, messages));
    }

    let principal = match verify_credentials(&state, &request.email, request.password).await {
        Ok(principal) => principal,
        Err(e @ AuthError::Unavailable(_)) => {
            record_login("unavailable");
            warn!(email = %request.email, error = %e, "Login failed: principal store unavailable");
            return Err(auth_failure(&e));
        }
        Err(e @ AuthError::Internal(_)) => {
            record_login("error");
            error!(email = %request.email, error = %e, "Login failed");
            return Err(auth_failure(&e));
        }
        Err(e) => {
            record_login("invalid_credentials");
            warn!(email = %request.email, "Login rejected: invalid credentials");
            return Err(auth_failure(&e));
        }
    };

    let token = state.tokens().issue_token(&principal).map_err(|e| {
        record_login("error");
        error!(email = %principal.email, error = %e, "Token issuance failed");
        auth_failure(&AuthError::Internal(e.to_string()))
    })?;

    record_login("success");
    info!(email = %principal.email, role = %principal.role, "Login succeeded");

    Ok(Json(ApiResponse::success(TokenResponse::bearer(
        token,
        state.tokens().ttl().num_seconds(),
    ))))
}

/// 토큰 갱신.
///
/// POST /auth/refresh
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "새 토큰 발급", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Authorization 헤더 없음", body = ApiResponse<TokenResponse>),
        (status = 401, description = "유효하지 않거나 만료된 토큰", body = ApiResponse<TokenResponse>)
    )
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> EnvelopeResult<TokenResponse> {
    let token = credential_from_headers(&headers).map_err(|e| {
        record_token_refresh("missing_token");
        failure(StatusCode::BAD_REQUEST, vec![e.to_string()])
    })?;

    let refreshed = state.tokens().refresh_token(token).map_err(|e| {
        record_token_refresh(e.as_label());
        info!(reason = %e, "Token refresh rejected");
        auth_failure(&AuthError::from(e))
    })?;

    record_token_refresh("success");

    Ok(Json(ApiResponse::success(TokenResponse::bearer(
        refreshed,
        state.tokens().ttl().num_seconds(),
    ))))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(login))
        .route("/refresh", post(refresh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{create_test_state, TEST_PASSWORD};
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(create_test_state());
        let router = Router::new()
            .nest("/auth", auth_router())
            .with_state(state.clone());
        (router, state)
    }

    async fn post_json(
        router: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_login_success() {
        let (router, state) = app();
        let (status, json) = post_json(
            router,
            "/auth",
            serde_json::json!({"email": "admin@kazale.com", "senha": TEST_PASSWORD}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["errors"], serde_json::json!([]));
        assert_eq!(json["data"]["token_type"], "Bearer");
        assert_eq!(json["data"]["expires_in"], 604_800);

        let token = json["data"]["token"].as_str().unwrap();
        assert!(state.tokens().validate_token(token));
        assert_eq!(
            state.tokens().subject_from_token(token).as_deref(),
            Some("admin@kazale.com")
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (router, _) = app();
        let (status, json) = post_json(
            router,
            "/auth",
            serde_json::json!({"email": "admin@kazale.com", "password": "wrong"}),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["data"].is_null());
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_unknown_user_looks_like_wrong_password() {
        let (router, _) = app();
        let (unknown_status, unknown) = post_json(
            router.clone(),
            "/auth",
            serde_json::json!({"email": "ghost@kazale.com", "password": TEST_PASSWORD}),
        )
        .await;
        let (wrong_status, wrong) = post_json(
            router,
            "/auth",
            serde_json::json!({"email": "admin@kazale.com", "password": "nope"}),
        )
        .await;

        assert_eq!(unknown_status, wrong_status);
        assert_eq!(unknown["errors"], wrong["errors"]);
    }

    #[tokio::test]
    async fn test_login_validation_errors() {
        let (router, _) = app();
        let (status, json) = post_json(
            router,
            "/auth",
            serde_json::json!({"email": "not-an-email", "password": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors: Vec<&str> = json["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e.as_str().unwrap())
            .collect();
        assert!(errors.contains(&"유효하지 않은 이메일입니다"));
        assert!(errors.contains(&"비밀번호는 비어 있을 수 없습니다"));
    }

    #[tokio::test]
    async fn test_login_malformed_json() {
        let (router, _) = app();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refresh_requires_header() {
        let (router, _) = app();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refresh_invalid_token() {
        let (router, _) = app();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/refresh")
                    .header(header::AUTHORIZATION, "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_issues_later_token() {
        let (router, state) = app();
        let principal = Principal::new(1, "admin@kazale.com", None, crate::auth::Role::Admin);
        let original = state.tokens().issue_token(&principal).unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/refresh")
                    .header(header::AUTHORIZATION, format!("Bearer {}", original))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let refreshed = json["data"]["token"].as_str().unwrap();

        let old = state.tokens().verify(&original).unwrap();
        let new = state.tokens().verify(refreshed).unwrap();
        assert_eq!(new.sub, old.sub);
        assert!(new.exp > old.exp);
    }
}
