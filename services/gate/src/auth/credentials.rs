//! 单一账号凭证校验。

/// 合法账号（启动时由配置注入，运行期只读）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// 构造账号。
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// 凭证校验器。
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    expected: Credentials,
}

impl CredentialVerifier {
    /// 绑定合法账号。
    pub fn new(expected: Credentials) -> Self {
        Self { expected }
    }

    /// 用户名、密码均非空且与配置完全一致时通过。
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }
        username == self.expected.username && password == self.expected.password
    }
}
