//! 请求入口：缓冲完整 body、组装 [`AuthRequest`]、调用路由并返回唯一响应。

use std::{fmt, pin::pin};

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{HeaderMap, Method},
};
use futures_util::{Stream, StreamExt};
use tracing::warn;

use crate::{
    api::{response::AuthResponse, types::AuthRequest},
    config::BodyLimits,
    router::route,
    state::AppState,
};

/// body 读取失败原因。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// 底层流报错。
    Read(String),
    /// 超过缓冲上限。
    TooLarge { limit: usize },
    /// 未在超时内读完。
    TimedOut,
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "read body failed: {err}"),
            Self::TooLarge { limit } => write!(f, "body exceeds {limit} bytes"),
            Self::TimedOut => write!(f, "body read timed out"),
        }
    }
}

/// 逐块读取 body 直到流结束；超过上限立即停止。
pub async fn read_body<S, E>(stream: S, limit: usize) -> Result<Bytes, BodyError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut stream = pin!(stream);
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| BodyError::Read(err.to_string()))?;
        if buf.len().saturating_add(chunk.len()) > limit {
            return Err(BodyError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// 带超时地缓冲完整 body。
pub async fn buffer_body<S, E>(stream: S, limits: BodyLimits) -> Result<Bytes, BodyError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    tokio::time::timeout(limits.timeout, read_body(stream, limits.max_bytes))
        .await
        .map_err(|_| BodyError::TimedOut)?
}

/// 处理单个请求。body 读取失败时按空 body 继续，由路由走对应的拒绝分支。
pub async fn handle<S, E>(
    state: &AppState,
    method: Method,
    path: &str,
    headers: HeaderMap,
    body: S,
) -> AuthResponse
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let body = match buffer_body(body, state.body_limits).await {
        Ok(body) => body,
        Err(err) => {
            warn!(method = %method, path, "{err}");
            Bytes::new()
        }
    };
    let req = AuthRequest {
        method,
        path: path.to_string(),
        headers,
        body,
    };
    route(state, &req)
}

/// axum 入口：接管全部方法与路径。
pub async fn gate_handler(State(state): State<AppState>, request: Request) -> AuthResponse {
    let (parts, body) = request.into_parts();
    handle(
        &state,
        parts.method,
        parts.uri.path(),
        parts.headers,
        body.into_data_stream(),
    )
    .await
}
