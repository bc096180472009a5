//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{PrincipalView, Role};
use crate::error::ApiErrorResponse;
use crate::routes::{ComponentHealth, ComponentStatus, HealthResponse, LoginRequest, TokenResponse};

// ==================== OpenAPI 문서 정의 ====================

/// Clockin API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clockin API",
        description = r#"
# 출퇴근 기록 REST API

## 인증

`POST /auth`로 발급받은 토큰을 `Authorization: Bearer <token>` 헤더로 전달합니다.
토큰은 `POST /auth/refresh`로 만료 전에 갱신할 수 있습니다.

- 401: 인증되지 않은 요청이 보호된 경로에 접근
- 403: 인증되었지만 역할이 맞지 않음
"#
    ),
    tags(
        (name = "auth", description = "로그인 및 토큰 갱신"),
        (name = "principals", description = "사용자 조회"),
        (name = "health", description = "헬스 체크")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            ApiErrorResponse,
            LoginRequest,
            TokenResponse,
            PrincipalView,
            Role,
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::principals::me,
        crate::routes::principals::get_principal,
    )
)]
pub struct ApiDoc;

/// Bearer 토큰 보안 스킴 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Clockin API"));

        assert!(json.contains("\"/auth\""));
        assert!(json.contains("/auth/refresh"));
        assert!(json.contains("/api/me"));
        assert!(json.contains("/api/principals/{email}"));
        assert!(json.contains("/health/ready"));
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("LoginRequest"));
        assert!(json.contains("TokenResponse"));
        assert!(json.contains("PrincipalView"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
