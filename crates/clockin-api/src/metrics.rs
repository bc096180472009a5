//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 상태(테스트 등)에서는 기록 함수가 아무것도 하지 않습니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`.
/// 레코더가 이미 설치되어 있으면 에러.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 로그인 시도 결과 기록 (`success`, `invalid_credentials`, `invalid_request`, `unavailable`).
pub fn record_login(outcome: &'static str) {
    counter!("auth_login_total", "outcome" => outcome).increment(1);
}

/// 요청 토큰 검증 결과 기록.
pub fn record_token_validation(outcome: &'static str) {
    counter!("auth_token_validation_total", "outcome" => outcome).increment(1);
}

/// 토큰 갱신 결과 기록.
pub fn record_token_refresh(outcome: &'static str) {
    counter!("auth_token_refresh_total", "outcome" => outcome).increment(1);
}

/// 인가 가드 거부 기록 (`unauthenticated`, `forbidden`).
pub fn record_guard_denied(reason: &'static str) {
    counter!("auth_guard_denied_total", "reason" => reason).increment(1);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 숫자/UUID는 `:id`, 이메일은 `:email`로 바꿔 라벨 카디널리티를 제한하고
/// 개인정보가 메트릭에 남지 않게 합니다.
///
/// 예: `/api/lancamentos/123` → `/api/lancamentos/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else if segment.contains('@') {
                ":email"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/lancamentos/123e4567-e89b-12d3-a456-426614174000";
        assert_eq!(normalize_path(path), "/api/lancamentos/:id");
    }

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/api/lancamentos/12345"), "/api/lancamentos/:id");
    }

    #[test]
    fn test_normalize_path_email() {
        assert_eq!(
            normalize_path("/api/principals/admin@kazale.com"),
            "/api/principals/:email"
        );
    }

    #[test]
    fn test_normalize_path_no_params() {
        assert_eq!(normalize_path("/auth/refresh"), "/auth/refresh");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_login("success");
        record_token_validation("valid");
        record_token_refresh("success");
        record_guard_denied("forbidden");
    }
}
