//! HTTP 요청 metrics middleware.
//!
//! 요청/응답 카운터와 처리 시간 히스토그램을 기록합니다.
//! 인증 필터보다 바깥에 등록되므로 가드가 거부한 401/403 응답도 집계됩니다.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 메트릭 path 라벨.
///
/// 라우트 템플릿(`/api/principals/{email}`)이 있으면 그대로 쓰고,
/// 없으면(404, 가드 거부 등) 식별자를 치환한 경로를 씁니다.
/// 라벨 카디널리티가 요청 경로 수만큼 늘어나지 않게 합니다.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| normalize_path(request.uri().path()))
}

/// HTTP 메트릭 미들웨어.
///
/// `axum::middleware::from_fn`으로 등록합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let route = route_label(&request);

    record_http_request(&method, &route);
    let response = next.run(request).await;

    record_http_response(&method, &route, response.status().as_u16());
    record_http_duration(&method, &route, started.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::StatusCode,
        middleware::from_fn,
        routing::{delete, get},
        Router,
    };
    use tower::ServiceExt;

    fn get_request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_route_label_without_matched_path() {
        assert_eq!(route_label(&get_request("/api/lancamentos/42")), "/api/lancamentos/:id");
        assert_eq!(
            route_label(&get_request("/api/principals/admin@kazale.com")),
            "/api/principals/:email"
        );
    }

    #[tokio::test]
    async fn test_layer_passes_response_through() {
        let app = Router::new()
            .route("/api/me", get(|| async { "me" }))
            .route("/api/lancamentos/{id}", delete(|| async { StatusCode::NO_CONTENT }))
            .layer(from_fn(metrics_layer));

        let response = app.clone().oneshot(get_request("/api/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/lancamentos/7")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_layer_records_unmatched_route() {
        let app = Router::new()
            .route("/api/me", get(|| async { "me" }))
            .layer(from_fn(metrics_layer));

        let response = app.oneshot(get_request("/api/nowhere/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
