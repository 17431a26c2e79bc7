//! Access token 签发与校验（`tgt_v1.<payload>.<sig>`）。
//!
//! payload 为 claims JSON 的 base64url，sig 为 payload 的 HMAC-SHA256。
//! token 自包含签名与过期时间，服务端不保存任何会话。

use anyhow::bail;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// token 版本前缀。
const TOKEN_VERSION: &str = "tgt_v1";

/// 当前 unix 秒。
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// 生成进程级随机签名密钥（未配置密钥时使用，重启后旧 token 全部失效）。
pub(crate) fn generate_signing_key_seed() -> String {
    format!(
        "tg_sk_{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// access token 携带的 claims。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 主体（用户名）。
    pub sub: String,
    /// 签发时间（unix 秒）。
    pub iat: u64,
    /// 过期时间（unix 秒），`exp <= now` 即失效。
    pub exp: u64,
    /// token 唯一 ID。
    pub jti: String,
}

/// token 校验失败原因，仅用于日志；对外统一返回 `invalid token!`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// 前缀或分段结构不对，或签名段无法解码。
    Malformed,
    /// 签名与密钥不匹配。
    BadSignature,
    /// 签名通过但 payload 无法解析。
    BadClaims,
    /// 已过期。
    Expired,
}

impl TokenRejection {
    /// 日志用错误码。
    pub fn code(self) -> &'static str {
        match self {
            Self::Malformed => "ACCESS_TOKEN_MALFORMED",
            Self::BadSignature => "ACCESS_TOKEN_SIGNATURE",
            Self::BadClaims => "ACCESS_TOKEN_CLAIMS",
            Self::Expired => "ACCESS_TOKEN_EXPIRED",
        }
    }
}

/// token 签发/校验服务；构造后只读，可在请求间共享。
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
    ttl_sec: u64,
}

impl TokenService {
    /// 使用签名密钥与有效期构造。
    pub fn new(signing_key: &str, ttl_sec: u64) -> anyhow::Result<Self> {
        if signing_key.is_empty() {
            bail!("token signing key must not be empty");
        }
        if ttl_sec == 0 {
            bail!("token ttl must be positive");
        }
        let mac = HmacSha256::new_from_slice(signing_key.as_bytes())
            .map_err(|err| anyhow::anyhow!("init token signer failed: {err}"))?;
        Ok(Self { mac, ttl_sec })
    }

    /// token 有效期（秒）。
    pub fn ttl_sec(&self) -> u64 {
        self.ttl_sec
    }

    /// 以当前时间签发。
    pub fn issue(&self, subject: &str) -> String {
        self.issue_at(subject, unix_now())
    }

    /// 以指定时间签发。
    pub fn issue_at(&self, subject: &str, now: u64) -> String {
        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_sec),
            jti: Uuid::new_v4().simple().to_string(),
        };
        // 字段只有字符串与整数，序列化不会失败。
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let sig_b64 = URL_SAFE_NO_PAD.encode(self.sign(payload_b64.as_bytes()));
        format!("{TOKEN_VERSION}.{payload_b64}.{sig_b64}")
    }

    /// 以当前时间校验。
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        self.verify_at(token, unix_now())
    }

    /// 以指定时间校验：先验签，再解析 claims，最后判断过期。
    pub fn verify_at(&self, token: &str, now: u64) -> Result<AccessClaims, TokenRejection> {
        let mut parts = token.split('.');
        let version = parts.next().unwrap_or_default();
        let payload_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if version != TOKEN_VERSION
            || payload_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err(TokenRejection::Malformed);
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| TokenRejection::Malformed)?;
        let mut mac = self.mac.clone();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| TokenRejection::BadSignature)?;

        let payload_raw = URL_SAFE_NO_PAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| TokenRejection::BadClaims)?;
        let claims: AccessClaims =
            serde_json::from_slice(&payload_raw).map_err(|_| TokenRejection::BadClaims)?;
        if claims.sub.is_empty() {
            return Err(TokenRejection::BadClaims);
        }

        if claims.exp <= now {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }

    /// HMAC-SHA256 原始签名。
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
