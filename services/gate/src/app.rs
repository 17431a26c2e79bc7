//! 网关应用装配：中间件、统一入口与监听。

use anyhow::Context;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{config::Config, handler::gate_handler, state::AppState};

/// 构建路由：所有方法与路径都交给 [`gate_handler`]，由内部路由统一分发。
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .fallback(gate_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 网关入口：装配状态并启动 HTTP 监听，收到 Ctrl-C 后优雅退出。
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    info!(
        user = %config.credentials.username,
        ttl_sec = config.token_ttl_sec,
        "tg-gate listening on {}",
        config.addr
    );
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("tg-gate stopped");
    Ok(())
}

/// 等待 Ctrl-C。
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("listen for shutdown signal failed: {err}");
        std::future::pending::<()>().await;
    }
}
