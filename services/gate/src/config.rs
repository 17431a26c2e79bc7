//! 配置模块职责：
//! 1. 读取网关运行所需的环境变量，并提供默认值。
//! 2. 校验监听地址、token 有效期与 body 读取限制等数值项。
//! 3. 为 `doctor` 输出脱敏后的配置摘要。

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, anyhow};
use serde_json::{Value, json};

use crate::auth::credentials::Credentials;

/// 默认监听地址。
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
/// 默认合法用户名。
pub const DEFAULT_USER: &str = "erickwendel";
/// 默认合法密码。
pub const DEFAULT_PASSWORD: &str = "123";
/// 默认 token 有效期（秒）。
pub const DEFAULT_TOKEN_TTL_SEC: u64 = 3600;
/// 默认请求 body 上限（字节）。
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;
/// 默认请求 body 读取超时（毫秒）。
pub const DEFAULT_BODY_TIMEOUT_MS: u64 = 10_000;

const ADDR_ENV: &str = "GATE_ADDR";
const USER_ENV: &str = "GATE_USER";
const PASSWORD_ENV: &str = "GATE_PASSWORD";
const TOKEN_SECRET_ENV: &str = "GATE_TOKEN_SECRET";
const TOKEN_TTL_ENV: &str = "GATE_TOKEN_TTL_SEC";
const BODY_LIMIT_ENV: &str = "GATE_BODY_LIMIT_BYTES";
const BODY_TIMEOUT_ENV: &str = "GATE_BODY_TIMEOUT_MS";

/// 请求 body 缓冲限制。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// 最多缓冲的字节数。
    pub max_bytes: usize,
    /// 读完整个 body 的最长等待时间。
    pub timeout: Duration,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_BODY_LIMIT_BYTES,
            timeout: Duration::from_millis(DEFAULT_BODY_TIMEOUT_MS),
        }
    }
}

/// 网关运行时配置。
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP 监听地址。
    pub addr: SocketAddr,
    /// 唯一合法账号。
    pub credentials: Credentials,
    /// token 签名密钥；未配置时启动期随机生成。
    pub token_secret: Option<String>,
    /// token 有效期（秒）。
    pub token_ttl_sec: u64,
    /// body 读取限制。
    pub body: BodyLimits,
}

impl Config {
    /// 从进程环境变量构建配置。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意 key 查询函数构建配置；空值回退默认值。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_addr = non_empty(&lookup, ADDR_ENV)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {ADDR_ENV}: {raw_addr}"))?;

        let username = non_empty(&lookup, USER_ENV)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_USER.to_string());
        let password =
            non_empty(&lookup, PASSWORD_ENV).unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
        let token_secret = non_empty(&lookup, TOKEN_SECRET_ENV);

        let token_ttl_sec = parse_positive(&lookup, TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL_SEC)?;
        let max_bytes = parse_positive(&lookup, BODY_LIMIT_ENV, DEFAULT_BODY_LIMIT_BYTES)?;
        let timeout_ms = parse_positive(&lookup, BODY_TIMEOUT_ENV, DEFAULT_BODY_TIMEOUT_MS)?;

        Ok(Self {
            addr,
            credentials: Credentials::new(username, password),
            token_secret,
            token_ttl_sec,
            body: BodyLimits {
                max_bytes,
                timeout: Duration::from_millis(timeout_ms),
            },
        })
    }

    /// 脱敏配置摘要（密码与密钥不输出原文）。
    pub fn summary(&self) -> Value {
        json!({
            "addr": self.addr.to_string(),
            "user": self.credentials.username,
            "password": mask(&self.credentials.password),
            "tokenSecret": match &self.token_secret {
                Some(secret) => mask(secret),
                None => "<ephemeral>".to_string(),
            },
            "tokenTtlSec": self.token_ttl_sec,
            "bodyLimitBytes": self.body.max_bytes,
            "bodyTimeoutMs": self.body.timeout.as_millis() as u64,
        })
    }
}

/// 读取非空环境值（空白视为未设置）。
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// 解析正整数配置；未设置时返回默认值，0 或非法值报错。
fn parse_positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = non_empty(lookup, key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("invalid {key}: {raw}"))?;
    if value == T::default() {
        return Err(anyhow!("{key} must be positive"));
    }
    Ok(value)
}

/// 脱敏：只保留长度信息。
fn mask(value: &str) -> String {
    format!("<{} chars>", value.chars().count())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::{Config, DEFAULT_TOKEN_TTL_SEC};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.credentials.username, "erickwendel");
        assert_eq!(config.credentials.password, "123");
        assert_eq!(config.token_secret, None);
        assert_eq!(config.token_ttl_sec, DEFAULT_TOKEN_TTL_SEC);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("GATE_ADDR", "127.0.0.1:8080"),
            ("GATE_USER", " alice "),
            ("GATE_PASSWORD", "s3cret"),
            ("GATE_TOKEN_SECRET", "k"),
            ("GATE_TOKEN_TTL_SEC", "90"),
            ("GATE_BODY_LIMIT_BYTES", "1024"),
            ("GATE_BODY_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.credentials.username, "alice");
        assert_eq!(config.credentials.password, "s3cret");
        assert_eq!(config.token_secret.as_deref(), Some("k"));
        assert_eq!(config.token_ttl_sec, 90);
        assert_eq!(config.body.max_bytes, 1024);
        assert_eq!(config.body.timeout, Duration::from_millis(250));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            Config::from_lookup(lookup(&[("GATE_USER", "  "), ("GATE_TOKEN_SECRET", "")])).unwrap();
        assert_eq!(config.credentials.username, "erickwendel");
        assert_eq!(config.token_secret, None);
    }

    #[test]
    fn invalid_numbers_and_addr_are_errors() {
        assert!(Config::from_lookup(lookup(&[("GATE_TOKEN_TTL_SEC", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GATE_TOKEN_TTL_SEC", "soon")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GATE_BODY_TIMEOUT_MS", "-1")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GATE_ADDR", "localhost")])).is_err());
    }

    #[test]
    fn summary_masks_secrets() {
        let config = Config::from_lookup(lookup(&[("GATE_TOKEN_SECRET", "topsecret")])).unwrap();
        let summary = config.summary().to_string();
        assert!(!summary.contains("topsecret"));
        assert!(summary.contains("<9 chars>"));
        assert!(summary.contains("<3 chars>"));
    }
}
