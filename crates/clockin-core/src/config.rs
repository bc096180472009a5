//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 기본값 → 설정 파일 → 환경 변수(`CLOCKIN__*`) 순서로 덮어씁니다.

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::Path;

use crate::error::{ClockinError, ClockinResult};

/// 서명 키 최소 길이 (바이트). HS256 키 길이와 같습니다.
pub const MIN_SECRET_LEN: usize = 32;

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
///
/// `url`이 없으면 인메모리 principal 저장소로 동작합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 접속 URL (선택적)
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    10
}

/// 인증 설정.
///
/// 서명 키와 토큰 유효 기간은 외부 입력이며 프로세스 수명 동안 읽기 전용입니다.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// JWT 서명 키 (HS256)
    pub jwt_secret: SecretString,
    /// 발급 토큰 유효 기간 (초)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// principal 조회 타임아웃 (밀리초)
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
}

fn default_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_lookup_timeout() -> u64 {
    2_000
}

impl AuthConfig {
    /// 새 인증 설정 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - 서명 키
    /// * `token_ttl_secs` - 토큰 유효 기간 (초)
    pub fn new(secret: impl Into<String>, token_ttl_secs: u64) -> Self {
        Self {
            jwt_secret: SecretString::from(secret.into()),
            token_ttl_secs,
            lookup_timeout_ms: default_lookup_timeout(),
        }
    }

    /// 토큰 유효 기간.
    ///
    /// 표현할 수 없는 값은 `None`. [`AuthConfig::validate`]를 통과한 설정은 항상 `Some`입니다.
    pub fn try_token_ttl(&self) -> Option<Duration> {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
    }

    /// 토큰 유효 기간. 표현할 수 없는 값은 최대 기간으로 고정됩니다.
    pub fn token_ttl(&self) -> Duration {
        self.try_token_ttl().unwrap_or(Duration::MAX)
    }

    /// principal 조회 타임아웃.
    pub fn lookup_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lookup_timeout_ms)
    }

    /// 서명 키 바이트.
    pub fn secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> ClockinResult<()> {
        let secret_len = self.secret_bytes().len();
        if secret_len < MIN_SECRET_LEN {
            return Err(ClockinError::Config(format!(
                "auth.jwt_secret는 최소 {}바이트여야 합니다 (현재 {}바이트)",
                MIN_SECRET_LEN, secret_len
            )));
        }
        if self.token_ttl_secs == 0 {
            return Err(ClockinError::Config(
                "auth.token_ttl_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.try_token_ttl().is_none() {
            return Err(ClockinError::Config(format!(
                "auth.token_ttl_secs가 너무 큽니다 ({}초)",
                self.token_ttl_secs
            )));
        }
        Ok(())
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일은 선택적입니다. 존재하지 않으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> ClockinResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("CLOCKIN")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    ///
    /// `CLOCKIN_CONFIG` 환경 변수가 있으면 해당 경로를 사용합니다.
    pub fn load_default() -> ClockinResult<Self> {
        let path = std::env::var("CLOCKIN_CONFIG")
            .unwrap_or_else(|_| "config/default.toml".to_string());
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::new(TEST_SECRET, 3600);
        assert_eq!(config.token_ttl(), Duration::hours(1));
        assert_eq!(config.lookup_timeout(), std::time::Duration::from_millis(2_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_config_rejects_short_secret() {
        let config = AuthConfig::new("short", 3600);
        assert!(matches!(config.validate(), Err(ClockinError::Config(_))));
    }

    #[test]
    fn test_auth_config_rejects_zero_ttl() {
        let config = AuthConfig::new(TEST_SECRET, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_config_rejects_unrepresentable_ttl() {
        let config = AuthConfig::new(TEST_SECRET, 100_000_000_000_000_000);
        assert!(matches!(config.validate(), Err(ClockinError::Config(_))));
        assert!(config.try_token_ttl().is_none());
        assert_eq!(config.token_ttl(), Duration::MAX);

        let config = AuthConfig::new(TEST_SECRET, u64::MAX);
        assert!(config.validate().is_err());
        assert_eq!(config.token_ttl(), Duration::MAX);
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = AuthConfig::new(TEST_SECRET, 3600);
        let debug = format!("{:?}", config);
        assert!(!debug.contains(TEST_SECRET));
    }

    #[test]
    fn test_server_bind_address() {
        let server = ServerConfig::default();
        assert_eq!(server.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = serde_json::json!({
            "auth": { "jwt_secret": TEST_SECRET }
        });
        let config: AppConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.token_ttl_secs, 7 * 24 * 60 * 60);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_missing_file_without_secret_fails() {
        // 파일도 환경 변수도 없으면 jwt_secret 누락으로 실패
        let result = AppConfig::load("does/not/exist.toml");
        if std::env::var("CLOCKIN__AUTH__JWT_SECRET").is_err() {
            assert!(result.is_err());
        }
    }
}
