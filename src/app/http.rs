// ==========================================
// 装箱发货计划 - HTTP 路由
// ==========================================
// 职责: axum 路由、JSON 绑定、错误响应、静态文件
// 路由:
// - GET  /api/v1/packs       查询箱型
// - POST /api/v1/packs       更新箱型
// - POST /api/v1/calculate   计算发货方案
// - GET  /healthz            健康检查
// - GET  /metrics            运行计数
// - GET  / 与 /web/*          前端静态文件
// ==========================================

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::api::{
    ApiError, ApiResult, CalculatePacksRequest, CalculatePacksResponse, GetPackSizesResponse,
    UpdatePackSizesRequest, UpdatePackSizesResponse,
};
use crate::app::state::AppState;
use crate::metrics::MetricsSnapshot;

type SharedState = Arc<AppState>;

// ==========================================
// 错误响应
// ==========================================
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn invalid_json(rejection: JsonRejection) -> ApiError {
    tracing::warn!(error = %rejection, "请求体 JSON 绑定失败");
    ApiError::InvalidInput("Invalid JSON body".to_string())
}

// ==========================================
// 路由
// ==========================================

/// 构建路由
pub fn create_router(state: SharedState) -> Router {
    let web_dir = state.config.web_dir.clone();

    let api = Router::new()
        .route("/packs", get(get_pack_sizes).post(update_pack_sizes))
        .route("/calculate", axum::routing::post(calculate_packs));

    Router::new()
        .nest("/api/v1", api)
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics))
        .nest_service("/web", ServeDir::new(&web_dir))
        .route_service("/", ServeFile::new(web_dir.join("index.html")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 启动 HTTP 服务（Ctrl+C / SIGTERM 优雅退出）
pub async fn serve(state: SharedState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = create_router(state);

    tracing::info!("Starting Pack Planner on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP 服务已退出");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("无法监听 Ctrl+C: {}", e);
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
                tracing::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("收到退出信号，开始优雅退出");
}

// ==========================================
// Handlers
// ==========================================

/// 在阻塞线程池上执行 API 调用（存储与规划均为同步实现）
async fn run_blocking<T, F>(f: F) -> Result<Json<T>, ApiError>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("阻塞任务异常退出: {}", e)))?
        .map(Json)
}

async fn get_pack_sizes(
    State(state): State<SharedState>,
) -> Result<Json<GetPackSizesResponse>, ApiError> {
    let api = state.pack_api.clone();
    run_blocking(move || api.get_pack_sizes()).await
}

async fn update_pack_sizes(
    State(state): State<SharedState>,
    payload: Result<Json<UpdatePackSizesRequest>, JsonRejection>,
) -> Result<Json<UpdatePackSizesResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_json)?;
    let api = state.pack_api.clone();
    run_blocking(move || api.update_pack_sizes(request)).await
}

async fn calculate_packs(
    State(state): State<SharedState>,
    payload: Result<Json<CalculatePacksRequest>, JsonRejection>,
) -> Result<Json<CalculatePacksResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_json)?;
    let api = state.pack_api.clone();
    run_blocking(move || api.calculate_packs(request)).await
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "message": "OK" }))
}

async fn metrics(State(state): State<SharedState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
