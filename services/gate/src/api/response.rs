//! 响应包裹：状态码 + JSON body，每个请求恰好生成一次。

use axum::{
    http::{
        HeaderValue, StatusCode,
        header::{ALLOW, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use tg_shared_protocol::{ErrorReply, INTERNAL_ERROR, ReplyBody};

/// 单次请求的响应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub status: StatusCode,
    pub body: ReplyBody,
    /// 405 时回填的 `Allow` 头。
    pub allow: Option<&'static str>,
}

impl AuthResponse {
    /// 序列化为状态码与 JSON 字节；序列化失败时退化为 500。
    pub fn encode(&self) -> (StatusCode, Vec<u8>) {
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => (self.status, bytes),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(r#"{{"error":"{INTERNAL_ERROR}"}}"#).into_bytes(),
            ),
        }
    }
}

/// 构造成功响应。
pub(crate) fn ok_response(body: ReplyBody) -> AuthResponse {
    AuthResponse {
        status: StatusCode::OK,
        body,
        allow: None,
    }
}

/// 构造错误响应。
pub(crate) fn error_response(
    status: StatusCode,
    message: &str,
    allow: Option<&'static str>,
) -> AuthResponse {
    AuthResponse {
        status,
        body: ReplyBody::Error(ErrorReply::new(message)),
        allow,
    }
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        let (status, bytes) = self.encode();
        let mut response = (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            bytes,
        )
            .into_response();
        if let Some(allow) = self.allow {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{StatusCode, header::ALLOW},
        response::IntoResponse,
    };
    use tg_shared_protocol::{ReplyBody, TokenReply};

    use super::{error_response, ok_response};

    #[test]
    fn encode_writes_compact_json() {
        let (status, bytes) = error_response(StatusCode::UNAUTHORIZED, "user invalid!", None).encode();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(bytes, br#"{"error":"user invalid!"}"#);

        let (status, bytes) = ok_response(ReplyBody::Token(TokenReply {
            token: "abc".to_string(),
        }))
        .encode();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, br#"{"token":"abc"}"#);
    }

    #[test]
    fn method_not_allowed_carries_allow_header() {
        let response =
            error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed!", Some("POST"))
                .into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response
                .headers()
                .get(ALLOW)
                .and_then(|value| value.to_str().ok()),
            Some("POST")
        );
    }
}
