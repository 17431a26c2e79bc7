//! 单次请求的内部表示。

use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderName, HeaderValue, Method},
};

/// 一次请求周期内的请求快照：方法、路径、头与完整 body。
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub method: Method,
    /// URI 路径（不含 query）。
    pub path: String,
    /// 头名大小写不敏感。
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl AuthRequest {
    /// 构造无头、无 body 的请求。
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// 追加请求头；非法头值直接忽略。
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// 设置原始 body。
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// 读取请求头字符串；缺失或非 UTF-8 视为空串。
    pub fn header_str(&self, name: &HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }
}
