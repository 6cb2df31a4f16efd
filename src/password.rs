use anyhow::Context;
use tracing::warn;

use crate::config::Config;

/// bcrypt 密码哈希
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bcrypt_cost)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Produces a salted bcrypt hash. Input longer than 72 bytes is truncated by bcrypt.
    pub fn hash(&self, password: &str) -> anyhow::Result<String> {
        bcrypt::hash(password, self.cost).context("hash password error")
    }

    /// 密码验证，哈希不匹配或格式错误都返回 false
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("failed to verify password hash: {}", e);
                false
            }
        }
    }

    /// `hash` on the blocking pool. bcrypt is CPU-bound, so handlers should call this one.
    pub async fn hash_blocking(&self, password: String) -> anyhow::Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")?
    }

    /// `verify` on the blocking pool. A panicked task counts as a mismatch.
    pub async fn verify_blocking(&self, password: String, hash: String) -> bool {
        let hasher = *self;
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                warn!("password verification task failed: {}", e);
                false
            }
        }
    }

    /// True when `hash` should be replaced on the next successful login.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        bcrypt_cost(hash) != Some(self.cost)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

// $2b$12$<22 salt chars><31 hash chars>
fn bcrypt_cost(hash: &str) -> Option<u32> {
    let mut parts = hash.split('$');
    if !parts.next()?.is_empty() {
        return None;
    }
    let version = parts.next()?;
    if !matches!(version, "2a" | "2b" | "2x" | "2y") {
        return None;
    }
    let cost = parts.next()?;
    let digest = parts.next()?;
    if cost.len() != 2 || digest.len() != 53 || parts.next().is_some() {
        return None;
    }
    cost.parse().ok()
}
