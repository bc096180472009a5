//! 공통 에러 타입.
//!
//! 설정 로드, 로깅 초기화 등 서버 기동 단계에서 사용되는 에러를 정의합니다.
//! 요청 처리 중의 인증 에러는 `clockin-api`의 `AuthError`가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum ClockinError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 로깅 초기화 에러
    #[error("로깅 에러: {0}")]
    Logging(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type ClockinResult<T> = Result<T, ClockinError>;

impl From<config::ConfigError> for ClockinError {
    fn from(err: config::ConfigError) -> Self {
        ClockinError::Config(err.to_string())
    }
}
