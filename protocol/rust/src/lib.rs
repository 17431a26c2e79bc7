// 文件职责：
// 1) 定义网关服务与调用方共用的请求/响应 JSON 结构。
// 2) 固定对外可见的路由路径与提示文案，服务端与测试共用同一份常量。
// 3) 作为 Rust 侧协议唯一代码源，供其他 crate 复用。

use serde::{Deserialize, Serialize};

/// 登录路由路径。
pub const LOGIN_PATH: &str = "/login";
/// 受保护资源路由路径。
pub const PROTECTED_PATH: &str = "/";

/// 登录失败提示。
pub const USER_INVALID: &str = "user invalid!";
/// token 缺失或无效提示。
pub const TOKEN_INVALID: &str = "invalid token!";
/// 受保护资源返回内容。
pub const WELCOME: &str = "Hey welcome!";
/// 未知路由提示。
pub const NOT_FOUND: &str = "not found!";
/// 路由存在但方法不支持时的提示。
pub const METHOD_NOT_ALLOWED: &str = "method not allowed!";
/// 服务内部错误提示。
pub const INTERNAL_ERROR: &str = "internal error!";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    // 用户名；缺省视为空串。
    #[serde(default)]
    pub user: String,
    // 密码；缺省视为空串。
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// 构造登录请求体。
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReply {
    // 签发的 access token。
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeReply {
    // 受保护资源内容。
    pub result: String,
}

impl WelcomeReply {
    /// 受保护资源的固定返回体。
    pub fn welcome() -> Self {
        Self {
            result: WELCOME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    // 错误提示文案。
    pub error: String,
}

impl ErrorReply {
    /// 构造错误返回体。
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// 任一合法响应体；按字段名区分，序列化后不带外层标签。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Token(TokenReply),
    Welcome(WelcomeReply),
    Error(ErrorReply),
}
