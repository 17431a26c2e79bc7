//! 鉴权模块：凭证校验与 access token 签发/校验。

pub mod credentials;
pub mod token;
