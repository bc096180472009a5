//! 인가 가드.
//!
//! (메서드, 경로 패턴) → 접근 요구사항 규칙 표를 위에서부터 검사하여
//! 처음 일치하는 규칙을 적용합니다. 일치하는 규칙이 없으면 기본값
//! (인증 필요)을 적용합니다.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::{AuthError, Role, SecurityContext};
use crate::metrics::record_guard_denied;

/// 접근 요구사항.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// 누구나 접근 가능
    Public,
    /// 인증된 사용자만
    Authenticated,
    /// 나열된 역할 중 하나를 가진 사용자만
    Roles(Vec<Role>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{name}` 또는 `*` - 한 세그먼트
    Param,
    /// `**` - 나머지 전부 (0개 이상)
    Rest,
}

/// 경로 패턴.
///
/// `/api/lancamentos/{id}`, `/swagger-ui/**` 형식을 지원합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s {
                "**" => Segment::Rest,
                "*" => Segment::Param,
                s if s.starts_with('{') && s.ends_with('}') => Segment::Param,
                s => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// 경로가 패턴과 일치하는지 확인합니다. 끝의 `/`는 무시합니다.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_path(path).collect();
        let mut i = 0;

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Param => {
                    if i >= parts.len() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if parts.get(i) != Some(&literal.as_str()) {
                        return false;
                    }
                }
            }
            i += 1;
        }

        i == parts.len()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// 접근 규칙.
#[derive(Debug, Clone)]
pub struct AccessRule {
    /// `None`이면 모든 메서드
    method: Option<Method>,
    pattern: PathPattern,
    access: Access,
}

impl AccessRule {
    fn applies_to(&self, method: &Method, path: &str) -> bool {
        self.method
            .as_ref()
            .map_or(true, |m| method_matches(m, method))
            && self.pattern.matches(path)
    }
}

/// 규칙 메서드와 요청 메서드 비교.
///
/// axum은 HEAD 요청을 GET 핸들러로 처리하므로 GET 규칙은 HEAD에도 적용됩니다.
fn method_matches(rule: &Method, request: &Method) -> bool {
    rule == request || (*rule == Method::GET && *request == Method::HEAD)
}

/// 접근 정책 (순서 있는 규칙 목록).
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Access,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPolicy {
    /// 규칙이 없는 정책. 모든 요청에 인증을 요구합니다.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Access::Authenticated,
        }
    }

    /// 규칙 추가. 먼저 추가한 규칙이 우선합니다.
    ///
    /// # Arguments
    ///
    /// * `method` - 대상 메서드 (`None`이면 전체)
    /// * `pattern` - 경로 패턴
    /// * `access` - 접근 요구사항
    #[must_use]
    pub fn rule(mut self, method: Option<Method>, pattern: &str, access: Access) -> Self {
        self.rules.push(AccessRule {
            method,
            pattern: PathPattern::parse(pattern),
            access,
        });
        self
    }

    /// 공개 규칙 추가.
    #[must_use]
    pub fn permit(self, method: Method, pattern: &str) -> Self {
        self.rule(Some(method), pattern, Access::Public)
    }

    /// 역할 제한 규칙 추가.
    #[must_use]
    pub fn require_roles(self, method: Method, pattern: &str, roles: &[Role]) -> Self {
        self.rule(Some(method), pattern, Access::Roles(roles.to_vec()))
    }

    /// 요청에 적용되는 접근 요구사항.
    pub fn required_access(&self, method: &Method, path: &str) -> &Access {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(method, path))
            .map(|rule| &rule.access)
            .unwrap_or(&self.fallback)
    }

    /// 요청을 허용할지 판단합니다.
    ///
    /// 익명 요청이 보호된 경로에 접근하면 [`AuthError::Unauthorized`],
    /// 역할이 맞지 않으면 [`AuthError::Forbidden`].
    pub fn check(&self, method: &Method, path: &str, ctx: &SecurityContext) -> Result<(), AuthError> {
        match self.required_access(method, path) {
            Access::Public => Ok(()),
            Access::Authenticated => ctx.principal().map(|_| ()).ok_or(AuthError::Unauthorized),
            Access::Roles(roles) => {
                let role = ctx.role().ok_or(AuthError::Unauthorized)?;
                if roles.contains(&role) {
                    Ok(())
                } else {
                    Err(AuthError::Forbidden)
                }
            }
        }
    }
}

/// 출퇴근 시스템 기본 접근 정책.
pub fn default_policy() -> AccessPolicy {
    AccessPolicy::new()
        // 인증
        .permit(Method::POST, "/auth")
        .permit(Method::POST, "/auth/refresh")
        // 헬스 체크, 메트릭, 문서
        .permit(Method::GET, "/health")
        .permit(Method::GET, "/health/ready")
        .permit(Method::GET, "/metrics")
        .permit(Method::GET, "/api-docs/**")
        .permit(Method::GET, "/swagger-ui/**")
        .permit(Method::GET, "/swagger-ui")
        // 가입
        .permit(Method::POST, "/api/empresas")
        .permit(Method::POST, "/api/funcionarios")
        // 관리자 전용
        .require_roles(Method::DELETE, "/api/lancamentos/{id}", &[Role::Admin])
        .require_roles(Method::GET, "/api/principals/{email}", &[Role::Admin])
        // 나머지 API
        .rule(None, "/api/**", Access::Authenticated)
}

/// 인가 가드 미들웨어.
///
/// 인증 필터 뒤에 등록해야 합니다. 컨텍스트가 없으면 익명으로 취급합니다.
pub async fn authorization_guard(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let anonymous = SecurityContext::anonymous();
    let ctx = request
        .extensions()
        .get::<SecurityContext>()
        .unwrap_or(&anonymous);

    let decision = policy.check(request.method(), request.uri().path(), ctx);
    match decision {
        Ok(()) => next.run(request).await,
        Err(e) => {
            let reason = match e {
                AuthError::Forbidden => "forbidden",
                _ => "unauthenticated",
            };
            record_guard_denied(reason);
            debug!(
                request_id = %ctx.request_id,
                method = %request.method(),
                path = %request.uri().path(),
                reason,
                "Access denied"
            );

            let body = e
                .to_body()
                .with_request_info(request.method(), request.uri());
            (e.status_code(), Json(body)).into_response()
        }
    }
}
