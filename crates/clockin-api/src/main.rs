//! 출퇴근 기록 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 로그인/토큰 갱신, 헬스 체크, 메트릭, API 문서 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use clockin_api::auth::PrincipalStore;
use clockin_api::metrics::setup_metrics_recorder;
use clockin_api::middleware::metrics_layer;
use clockin_api::openapi::swagger_ui_router;
use clockin_api::repository::{InMemoryPrincipalStore, PgPrincipalStore};
use clockin_api::routes::{create_api_router, with_security};
use clockin_api::state::AppState;
use clockin_core::{init_logging, AppConfig, DatabaseConfig, LogConfig, SystemClock};

/// 인증 주체 저장소 생성.
///
/// `database.url`이 설정되어 있으면 PostgreSQL, 없으면 빈 메모리 저장소를 사용합니다.
async fn create_principal_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn PrincipalStore>> {
    let Some(database_url) = config.url.as_deref() else {
        warn!("database.url not set, using empty in-memory principal store (login disabled)");
        return Ok(Arc::new(InMemoryPrincipalStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(database_url)
        .await
        .context("데이터베이스 연결 실패")?;

    let store = PgPrincipalStore::new(pool);
    store
        .ping()
        .await
        .context("데이터베이스 연결 확인 실패")?;
    info!("Connected to PostgreSQL principal store");

    Ok(Arc::new(store))
}

/// CORS 레이어 생성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
fn cors_layer() -> CorsLayer {
    let configured: Vec<HeaderValue> = std::env::var("CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let allow_origin = if configured.is_empty() {
        warn!("CORS_ORIGINS not set or invalid, allowing any origin (development mode)");
        AllowOrigin::any()
    } else {
        info!("CORS configured with {} allowed origins", configured.len());
        AllowOrigin::list(configured.clone())
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 와일드카드 origin과 자격 증명은 함께 쓸 수 없음
        .allow_credentials(!configured.is_empty())
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
///
/// 메트릭과 문서 라우트도 인증 필터/가드를 거치며, 접근 정책에서 공개로 지정됩니다.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let router = Router::new()
        .merge(create_api_router().with_state(state.clone()))
        .merge(metrics_router)
        .merge(swagger_ui_router());

    with_security(router, &state)
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    use clockin_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        println!("{}", serde_json::to_string_pretty(&ApiDoc::openapi())?);
        return Ok(true);
    }

    Ok(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    if handle_export_openapi()? {
        return Ok(());
    }

    // 설정 로드 (서명 키 검증 포함)
    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging))?;
    info!("Starting Clockin API server...");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = config.server.bind_address().parse().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. CLOCKIN__SERVER__HOST, CLOCKIN__SERVER__PORT를 확인하세요."
        );
        e
    })?;

    let principals = create_principal_store(&config.database).await?;
    let state = Arc::new(AppState::new(&config.auth, principals, Arc::new(SystemClock)));

    info!(
        version = %state.version,
        token_ttl_secs = config.auth.token_ttl_secs,
        lookup_timeout_ms = config.auth.lookup_timeout_ms,
        "Application state initialized"
    );

    let shutdown_token = state.shutdown_token.clone();
    let app = create_router(state, metrics_handle);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token))
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
///
/// # Arguments
/// * `shutdown_token` - 종료를 전파할 CancellationToken
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {
            info!("Shutdown requested internally");
        }
    }

    shutdown_token.cancel();
}
