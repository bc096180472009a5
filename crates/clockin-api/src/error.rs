//! 통합 API 응답 타입.
//!
//! - [`ApiResponse`]: 인증 엔드포인트가 사용하는 `{data, errors}` 봉투
//! - [`ApiErrorResponse`]: 필터/가드/추출기 거부 시 사용하는 에러 본문

use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 데이터 또는 에러 목록을 담는 응답 봉투.
///
/// ```json
/// { "data": { "token": "eyJ..." }, "errors": [] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// 성공 시 데이터
    pub data: Option<T>,
    /// 실패 시 사람이 읽을 수 있는 에러 메시지 목록
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// 성공 응답.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// 실패 응답.
    pub fn failure(errors: Vec<String>) -> Self {
        Self { data: None, errors }
    }
}

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "FORBIDDEN",
///   "message": "권한이 부족합니다",
///   "timestamp": 1738300800,
///   "method": "DELETE",
///   "path": "/api/lancamentos/1"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "UNAUTHORIZED", "FORBIDDEN", "INVALID_TOKEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// HTTP 메서드 (GET, POST 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 요청 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// # Arguments
    ///
    /// * `code` - 에러 코드
    /// * `message` - 에러 메시지
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
            method: None,
            path: None,
        }
    }

    /// 요청 정보(메서드, 경로)를 추가합니다.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP 메서드 (GET, POST 등)
    /// * `uri` - 요청 URI
    #[must_use]
    pub fn with_request_info(mut self, method: &Method, uri: &Uri) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(uri.path().to_string());
        self
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 봉투 응답을 사용하는 핸들러의 Result 타입.
pub type EnvelopeResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("token");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["data"], "token");
        assert_eq!(json["errors"], serde_json::json!([]));
    }

    #[test]
    fn test_api_response_failure() {
        let response: ApiResponse<String> =
            ApiResponse::failure(vec!["이메일 필수".to_string(), "비밀번호 필수".to_string()]);
        let json = serde_json::to_value(&response).unwrap();

        assert!(json["data"].is_null());
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("UNAUTHORIZED", "인증이 필요합니다");
        assert_eq!(error.code, "UNAUTHORIZED");
        assert!(error.timestamp.is_some());

        // 요청 정보가 없으면 필드 자체를 생략
        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("method"));
        assert!(!json.contains("path"));
        assert!(json.contains(r#""code":"UNAUTHORIZED""#));
    }

    #[test]
    fn test_with_request_info() {
        let uri: Uri = "/api/lancamentos/1?x=1".parse().unwrap();
        let error = ApiErrorResponse::new("FORBIDDEN", "권한이 부족합니다")
            .with_request_info(&Method::DELETE, &uri);

        assert_eq!(error.method.as_deref(), Some("DELETE"));
        assert_eq!(error.path.as_deref(), Some("/api/lancamentos/1"));
    }
}
