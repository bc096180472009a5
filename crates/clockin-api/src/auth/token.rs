//! 토큰 서비스.
//!
//! 발급, 검증, 갱신을 담당하며 현재 시각은 주입된 [`Clock`]에서 읽습니다.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clockin_core::{AuthConfig, Clock};

use super::jwt::{Claims, TokenCodec, TokenError};
use super::Principal;

/// 토큰 서비스.
///
/// 서명 키와 유효 기간은 생성 시점에 고정됩니다.
#[derive(Clone)]
pub struct TokenService {
    codec: TokenCodec,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// 인증 설정과 시계로 서비스 생성.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec: TokenCodec::new(config.secret_bytes()),
            ttl: config.token_ttl(),
            clock,
        }
    }

    /// 토큰 유효 기간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 인증 주체에 대한 토큰 발급.
    ///
    /// subject는 이메일, 발급 시각은 현재 시각, 만료는 발급 시각 + TTL입니다.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(&principal.email, self.clock.now())
    }

    fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, issued_at, self.ttl)?;
        self.codec.encode(&claims)
    }

    /// 서명을 검증한 토큰의 subject.
    ///
    /// 만료 여부는 보지 않습니다. 서명이 틀리거나 형식이 잘못되면 `None`.
    pub fn subject_from_token(&self, token: &str) -> Option<String> {
        self.codec.decode(token).ok().map(|claims| claims.sub)
    }

    /// 현재 시각 기준으로 토큰을 검증합니다.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, self.clock.now())
    }

    /// 주어진 시각 기준으로 토큰을 검증합니다.
    ///
    /// 서명, 형식, 만료(`now >= exp`)를 모두 확인합니다.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.codec.decode(token)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// 토큰 유효 여부.
    pub fn validate_token(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }

    /// 유효한 토큰으로 새 토큰 발급.
    ///
    /// subject는 유지하고 유효 기간을 다시 시작합니다. 새 만료 시각은
    /// 같은 초 안에 갱신하더라도 기존 토큰의 만료 시각보다 항상 늦습니다.
    pub fn refresh_token(&self, token: &str) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = self.verify_at(token, now)?;

        let issued_at = now.max(claims.issued_at() + Duration::seconds(1));
        self.issue_at(&claims.sub, issued_at)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}
