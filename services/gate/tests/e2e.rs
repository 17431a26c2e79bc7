//! 端到端：真实监听随机端口，用 reqwest 走完整登录/访问流程。

use std::{net::SocketAddr, time::Duration};

use reqwest::{StatusCode, header::AUTHORIZATION};
use serde_json::{Value, json};
use tg_gate::{
    app::build_router,
    auth::{
        credentials::{CredentialVerifier, Credentials},
        token::TokenService,
    },
    config::BodyLimits,
    state::AppState,
};
use tg_shared_protocol::{ErrorReply, LoginRequest, TokenReply, WelcomeReply};

async fn spawn_gate() -> String {
    let state = AppState::new(
        TokenService::new("e2e-secret", 60).unwrap(),
        CredentialVerifier::new(Credentials::new("erickwendel", "123")),
        BodyLimits {
            max_bytes: 4096,
            timeout: Duration::from_secs(2),
        },
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn login(client: &reqwest::Client, base: &str, body: &LoginRequest) -> reqwest::Response {
    client
        .post(format!("{base}/login"))
        .body(serde_json::to_string(body).unwrap())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn login_then_access_protected_resource() {
    let base = spawn_gate().await;
    let client = reqwest::Client::new();

    let rejected = login(&client, &base, &LoginRequest::new("invalid", "")).await;
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        rejected.json::<ErrorReply>().await.unwrap(),
        ErrorReply::new("user invalid!")
    );

    let accepted = login(&client, &base, &LoginRequest::new("erickwendel", "123")).await;
    assert_eq!(accepted.status(), StatusCode::OK);
    let token = accepted.json::<TokenReply>().await.unwrap().token;
    assert!(token.len() > 20, "token too short: {token}");

    let welcomed = client
        .get(format!("{base}/"))
        .header(AUTHORIZATION, &token)
        .send()
        .await
        .unwrap();
    assert_eq!(welcomed.status(), StatusCode::OK);
    assert_eq!(
        welcomed.json::<WelcomeReply>().await.unwrap(),
        WelcomeReply::welcome()
    );

    let denied = client
        .get(format!("{base}/"))
        .header(AUTHORIZATION, "")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        denied.json::<ErrorReply>().await.unwrap(),
        ErrorReply::new("invalid token!")
    );
}

#[tokio::test]
async fn missing_header_and_foreign_token_are_rejected() {
    let base = spawn_gate().await;
    let client = reqwest::Client::new();

    let missing = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let foreign = TokenService::new("someone-else", 60)
        .unwrap()
        .issue("erickwendel");
    let forged = client
        .get(format!("{base}/"))
        .header(AUTHORIZATION, foreign)
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        forged.json::<Value>().await.unwrap(),
        json!({ "error": "invalid token!" })
    );
}

#[tokio::test]
async fn malformed_login_body_is_unauthorized() {
    let base = spawn_gate().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/login"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "error": "user invalid!" })
    );
}

#[tokio::test]
async fn unmatched_routes_get_json_errors() {
    let base = spawn_gate().await;
    let client = reqwest::Client::new();

    let missing = client.get(format!("{base}/nowhere")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        missing.json::<Value>().await.unwrap(),
        json!({ "error": "not found!" })
    );

    let wrong_method = client.get(format!("{base}/login")).send().await.unwrap();
    assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        wrong_method
            .headers()
            .get(reqwest::header::ALLOW)
            .and_then(|value| value.to_str().ok()),
        Some("POST")
    );
}

#[tokio::test]
async fn login_path_ignores_query_string() {
    let base = spawn_gate().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/login?next=/"))
        .json(&LoginRequest::new("erickwendel", "123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
