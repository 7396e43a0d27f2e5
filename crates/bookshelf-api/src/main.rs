//! Bookshelf API 서버 진입점.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use bookshelf_api::metrics::setup_metrics_recorder;
use bookshelf_api::middleware::metrics_layer;
use bookshelf_api::openapi::swagger_ui_router;
use bookshelf_api::repository::{MemoryBookStore, MemoryUserStore, PgBookStore, PgUserStore};
use bookshelf_api::routes::create_api_router;
use bookshelf_api::state::AppState;
use bookshelf_core::{init_logging, AppConfig, DatabaseConfig};

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 있으면 해당 origin만 허용하고 자격 증명(쿠키)을 허용합니다.
/// 없으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: AppState, metrics_handle: PrometheusHandle, timeout: Duration) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let api_router = create_api_router(&state.gate).with_state(Arc::new(state));

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors_layer())
}

async fn connect_database(config: &DatabaseConfig, url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    info!("Connected to PostgreSQL, migrations applied");
    Ok(pool)
}

/// 저장소를 고르고 AppState 생성.
///
/// DB URL이 있으면 연결 실패는 기동 실패입니다. 없으면 인메모리 저장소를 사용합니다.
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let state = match &config.database.url {
        Some(url) => {
            let pool = connect_database(&config.database, url).await?;
            AppState::new(
                &config.auth,
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgBookStore::new(pool.clone())),
            )?
            .with_db_pool(pool)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            AppState::new(
                &config.auth,
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemoryBookStore::new()),
            )?
        }
    };

    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("failed to load configuration")?;
    init_logging(&config.logging)?;

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration, refusing to start");
        return Err(e.into());
    }

    info!(
        carrier = ?config.auth.carrier,
        token_ttl_hours = config.auth.token_ttl_hours,
        "Starting Bookshelf API"
    );

    let metrics_handle = setup_metrics_recorder().context("failed to install metrics recorder")?;
    let state = build_state(&config).await?;

    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let app = create_router(state, metrics_handle, timeout);

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.server.bind_address()))?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
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
    }
}
