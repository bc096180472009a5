//! Axum용 인증 필터.
//!
//! 모든 요청에 대해 한 번 실행되어 `Authorization` 헤더의 토큰을 확인하고
//! 요청 extensions에 [`SecurityContext`]를 설치합니다.
//! 필터는 요청을 거부하지 않습니다. 거부는 인가 가드의 몫입니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::{AuthError, Authentication, Principal, PrincipalStore, SecurityContext, StoreError, TokenService};
use crate::metrics::record_token_validation;

/// 토큰 앞에 붙는 스킴.
pub const BEARER_PREFIX: &str = "Bearer ";

/// 필터가 이미 실행되었음을 나타내는 표식.
#[derive(Debug, Clone, Copy)]
struct FilterApplied;

/// 인증 필터 상태.
#[derive(Clone)]
pub struct AuthState {
    /// 토큰 서비스
    pub tokens: Arc<TokenService>,
    /// 인증 주체 저장소
    pub principals: Arc<dyn PrincipalStore>,
    /// 저장소 조회 제한 시간
    pub lookup_timeout: Duration,
}

impl AuthState {
    pub fn new(
        tokens: Arc<TokenService>,
        principals: Arc<dyn PrincipalStore>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            tokens,
            principals,
            lookup_timeout,
        }
    }

    /// 제한 시간 안에서 이메일로 인증 주체 조회.
    pub async fn find_principal(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        match tokio::time::timeout(self.lookup_timeout, self.principals.find_by_email(email)).await
        {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

/// `Authorization` 헤더에서 토큰 문자열을 꺼냅니다.
///
/// `Bearer ` 접두가 있으면 제거하고, 없으면 값 전체를 토큰으로 봅니다.
pub fn credential_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// 인증 필터 미들웨어.
///
/// `axum::middleware::from_fn_with_state`로 등록합니다.
/// 같은 요청에 두 번 적용되어도 두 번째 실행은 아무것도 하지 않습니다.
pub async fn authentication_filter(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<FilterApplied>().is_some() {
        return next.run(request).await;
    }
    request.extensions_mut().insert(FilterApplied);

    let already_authenticated = request
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated);

    if !already_authenticated {
        let authentication = authenticate(&auth, request.headers()).await;
        let context = SecurityContext {
            authentication,
            ..SecurityContext::anonymous()
        };
        request.extensions_mut().insert(context);
    }

    next.run(request).await
}

async fn authenticate(auth: &AuthState, headers: &HeaderMap) -> Authentication {
    let Ok(token) = credential_from_headers(headers) else {
        return Authentication::Anonymous;
    };

    // 한 번의 디코딩으로 서명, 형식, 만료를 함께 확인
    let subject = match auth.tokens.verify(token) {
        Ok(claims) => claims.sub,
        Err(e) => {
            record_token_validation(e.as_label());
            debug!(reason = %e, "Token rejected, continuing anonymously");
            return Authentication::Anonymous;
        }
    };

    match auth.find_principal(&subject).await {
        Ok(Some(principal)) => {
            record_token_validation("valid");
            debug!(subject = %subject, role = %principal.role, "Request authenticated");
            Authentication::Authenticated(principal.view())
        }
        Ok(None) => {
            record_token_validation("unknown_subject");
            debug!(subject = %subject, "Token subject not found, continuing anonymously");
            Authentication::Anonymous
        }
        Err(e) => {
            record_token_validation("lookup_failed");
            warn!(subject = %subject, error = %e, "Principal lookup failed, continuing anonymously");
            Authentication::Anonymous
        }
    }
}
