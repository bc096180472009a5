//! 인증 및 권한 부여.
//!
//! 상태 없는 JWT 인증과 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`] / [`verify_password`]: Argon2 비밀번호 해싱
//! - [`TokenCodec`]: HS256 토큰 인코딩/디코딩
//! - [`TokenService`]: 토큰 발급/검증/갱신 (주입된 시계 사용)
//! - [`authentication_filter`]: 요청마다 [`SecurityContext`]를 설치하는 미들웨어
//! - [`authorization_guard`]: [`AccessPolicy`]에 따라 401/403을 반환하는 미들웨어
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! // 보호된 라우트에서 CurrentPrincipal 추출기 사용
//! async fn protected_handler(
//!     CurrentPrincipal(principal): CurrentPrincipal,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", principal.email)
//! }
//! ```

mod context;
mod error;
mod guard;
mod jwt;
mod middleware;
mod password;
mod principal;
mod roles;
mod token;

pub use context::{Authentication, CurrentPrincipal, OptionalPrincipal, SecurityContext};
pub use error::AuthError;
pub use guard::{authorization_guard, default_policy, Access, AccessPolicy, PathPattern};
pub use jwt::{Claims, TokenCodec, TokenError};
pub use middleware::{authentication_filter, credential_from_headers, AuthState, BEARER_PREFIX};
pub use password::{
    hash_optional_password, hash_password, verify_password, PasswordError, DUMMY_PASSWORD_HASH,
};
pub use principal::{Principal, PrincipalStore, PrincipalView, StoreError};
pub use roles::Role;
pub use token::TokenService;
