//! 网关共享状态：启动后只读，请求间通过 Arc 共享。

use std::sync::Arc;

use tracing::info;

use crate::{
    auth::{
        credentials::CredentialVerifier,
        token::{TokenService, generate_signing_key_seed},
    },
    config::{BodyLimits, Config},
};

/// 网关共享状态。
#[derive(Clone)]
pub struct AppState {
    /// token 签发/校验。
    pub tokens: Arc<TokenService>,
    /// 账号校验。
    pub verifier: Arc<CredentialVerifier>,
    /// body 读取限制。
    pub body_limits: BodyLimits,
}

impl AppState {
    /// 直接由组件装配。
    pub fn new(tokens: TokenService, verifier: CredentialVerifier, body_limits: BodyLimits) -> Self {
        Self {
            tokens: Arc::new(tokens),
            verifier: Arc::new(verifier),
            body_limits,
        }
    }

    /// 由配置装配；未配置密钥时生成进程级随机密钥。
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let signing_key = match &config.token_secret {
            Some(secret) => secret.clone(),
            None => {
                info!("GATE_TOKEN_SECRET not set, using ephemeral signing key");
                generate_signing_key_seed()
            }
        };
        let tokens = TokenService::new(&signing_key, config.token_ttl_sec)?;
        let verifier = CredentialVerifier::new(config.credentials.clone());
        Ok(Self::new(tokens, verifier, config.body))
    }
}
