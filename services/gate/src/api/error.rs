//! 请求级错误定义与响应转换。

use axum::http::StatusCode;
use tg_shared_protocol::{METHOD_NOT_ALLOWED, NOT_FOUND, TOKEN_INVALID, USER_INVALID};

use super::response::{AuthResponse, error_response};

/// 请求被拒绝的原因；对外只暴露固定文案，code 仅写日志。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: &'static str,
    pub allow: Option<&'static str>,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub fn new(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status,
            code,
            message,
            allow: None,
        }
    }

    /// 登录凭证无效（401）。
    pub fn user_invalid(code: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, USER_INVALID)
    }

    /// token 缺失、无效或过期（400，保持与既有客户端一致）。
    pub fn token_invalid(code: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, TOKEN_INVALID)
    }

    /// 未知路由（404）。
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND", NOT_FOUND)
    }

    /// 路由存在但方法不支持（405）。
    pub fn method_not_allowed(allow: &'static str) -> Self {
        Self {
            allow: Some(allow),
            ..Self::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                METHOD_NOT_ALLOWED,
            )
        }
    }

    /// 转换为统一响应体。
    pub fn into_response(self) -> AuthResponse {
        error_response(self.status, self.message, self.allow)
    }
}
