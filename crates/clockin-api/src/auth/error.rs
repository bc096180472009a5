//! 인증/인가 에러.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{StoreError, TokenError};
use crate::error::ApiErrorResponse;

/// 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("유효하지 않은 토큰: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("사용자를 찾을 수 없습니다: {0}")]
    PrincipalNotFound(String),
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,
    #[error("인증이 필요합니다")]
    Unauthorized,
    #[error("권한이 부족합니다")]
    Forbidden,
    #[error("인증 저장소를 사용할 수 없습니다")]
    Unavailable(#[from] StoreError),
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::InvalidCredentials
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::PrincipalNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            AuthError::InvalidToken(TokenError::Expired) => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::PrincipalNotFound(_) => "PRINCIPAL_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 클라이언트에 노출할 메시지.
    ///
    /// 저장소/내부 에러의 세부 내용은 감춥니다.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Internal(_) => "내부 에러가 발생했습니다".to_string(),
            other => other.to_string(),
        }
    }

    /// 에러 본문.
    pub fn to_body(&self) -> ApiErrorResponse {
        ApiErrorResponse::new(self.code(), self.public_message())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_responses() {
        let cases = vec![
            (AuthError::MissingToken, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidAuthHeader, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken(TokenError::BadSignature), StatusCode::UNAUTHORIZED),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::PrincipalNotFound("x@y.com".into()), StatusCode::NOT_FOUND),
            (AuthError::Unavailable(StoreError::Timeout), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_expired_token_code() {
        assert_eq!(AuthError::from(TokenError::Expired).code(), "TOKEN_EXPIRED");
        assert_eq!(AuthError::from(TokenError::Malformed).code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_internal_details_hidden() {
        let error = AuthError::Internal("connection string leaked".into());
        assert!(!error.public_message().contains("leaked"));
    }

    #[tokio::test]
    async fn test_body_shape() {
        let response = AuthError::Forbidden.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "권한이 부족합니다");
    }
}
