//! 路由分发：按 (method, path) 选择登录或受保护资源流程。
//!
//! | 路由 | 成功 | 失败 |
//! |---|---|---|
//! | `POST /login` | 200 `{token}` | 401 `{error:"user invalid!"}` |
//! | `GET /` | 200 `{result:"Hey welcome!"}` | 400 `{error:"invalid token!"}` |
//!
//! 已知路径的其他方法返回 405，其余路径返回 404。

use axum::http::{Method, header::AUTHORIZATION};
use tg_shared_protocol::{LOGIN_PATH, LoginRequest, PROTECTED_PATH, ReplyBody, TokenReply, WelcomeReply};
use tracing::{debug, info, warn};

use crate::{
    api::{
        error::ApiError,
        response::{AuthResponse, ok_response},
        types::AuthRequest,
    },
    state::AppState,
};

/// 分发单个请求，拒绝路径统一转换为 JSON 错误响应。
pub fn route(state: &AppState, req: &AuthRequest) -> AuthResponse {
    let result = match req.path.as_str() {
        LOGIN_PATH if req.method == Method::POST => login(state, req),
        LOGIN_PATH => Err(ApiError::method_not_allowed("POST")),
        PROTECTED_PATH if req.method == Method::GET => protected(state, req),
        PROTECTED_PATH => Err(ApiError::method_not_allowed("GET")),
        _ => Err(ApiError::not_found()),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            warn!(
                method = %req.method,
                path = %req.path,
                status = err.status.as_u16(),
                code = err.code,
                "request rejected"
            );
            err.into_response()
        }
    }
}

/// 登录：校验账号并签发 token。body 无法解析时按凭证无效处理。
fn login(state: &AppState, req: &AuthRequest) -> Result<AuthResponse, ApiError> {
    let body: LoginRequest = serde_json::from_slice(&req.body)
        .map_err(|_| ApiError::user_invalid("LOGIN_BODY_INVALID"))?;
    if !state.verifier.verify(&body.user, &body.password) {
        return Err(ApiError::user_invalid("LOGIN_CREDENTIALS_INVALID"));
    }

    let token = state.tokens.issue(&body.user);
    info!(user = %body.user, ttl_sec = state.tokens.ttl_sec(), "login succeeded");
    Ok(ok_response(ReplyBody::Token(TokenReply { token })))
}

/// 受保护资源：`Authorization` 原值即 token，不剥离 `Bearer ` 前缀。
fn protected(state: &AppState, req: &AuthRequest) -> Result<AuthResponse, ApiError> {
    let token = req.header_str(&AUTHORIZATION);
    if token.is_empty() {
        return Err(ApiError::token_invalid("ACCESS_TOKEN_MISSING"));
    }

    let claims = state
        .tokens
        .verify(token)
        .map_err(|rejection| ApiError::token_invalid(rejection.code()))?;
    debug!(sub = %claims.sub, exp = claims.exp, "access granted");
    Ok(ok_response(ReplyBody::Welcome(WelcomeReply::welcome())))
}
