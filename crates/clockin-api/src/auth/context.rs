//! 요청 단위 보안 컨텍스트.
//!
//! 인증 필터가 요청 extensions에 [`SecurityContext`]를 설치하고,
//! 인가 가드와 핸들러는 이를 읽기만 합니다. 요청 간에 공유되지 않습니다.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::{AuthError, PrincipalView, Role};

/// 요청의 인증 상태.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Authentication {
    /// 익명 요청
    #[default]
    Anonymous,
    /// 인증된 요청
    Authenticated(PrincipalView),
}

/// 요청 단위 보안 컨텍스트.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    /// 요청 ID (로그 상관관계용)
    pub request_id: Uuid,
    /// 인증 상태
    pub authentication: Authentication,
}

impl SecurityContext {
    /// 익명 컨텍스트.
    pub fn anonymous() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            authentication: Authentication::Anonymous,
        }
    }

    /// 인증된 컨텍스트.
    pub fn authenticated(principal: PrincipalView) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            authentication: Authentication::Authenticated(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.authentication, Authentication::Authenticated(_))
    }

    /// 인증된 주체.
    pub fn principal(&self) -> Option<&PrincipalView> {
        match &self.authentication {
            Authentication::Authenticated(principal) => Some(principal),
            Authentication::Anonymous => None,
        }
    }

    /// 인증된 주체의 역할.
    pub fn role(&self) -> Option<Role> {
        self.principal().map(|p| p.role)
    }
}

impl Default for SecurityContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// 인증된 주체 추출기.
///
/// 인증 필터가 설치한 컨텍스트에서 주체를 꺼냅니다. 익명이면 401.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> impl IntoResponse {
///     format!("Hello, {}!", principal.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub PrincipalView);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(|ctx| ctx.principal().cloned())
            .map(CurrentPrincipal)
            .ok_or(AuthError::Unauthorized)
    }
}

/// 선택적 주체 추출기.
///
/// 인증되어 있으면 `Some`, 아니면 `None`을 반환합니다.
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<PrincipalView>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentPrincipal::from_request_parts(parts, state).await {
            Ok(CurrentPrincipal(principal)) => Ok(OptionalPrincipal(Some(principal))),
            Err(_) => Ok(OptionalPrincipal(None)),
        }
    }
}
