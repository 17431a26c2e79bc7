//! 对外 API：请求/响应类型与统一错误。

pub mod error;
pub mod response;
pub mod types;
