use std::fmt::{self, Debug};

use anyhow::{anyhow, bail, Context};
use validator::Validate;

use crate::constants::{
    DEFAULT_DATABASE_ECHO, DEFAULT_PORT, ENV_BCRYPT_COST, ENV_DATABASE_ECHO, ENV_DATABASE_URL,
    ENV_DELIVERY_API_KEY, ENV_PORT, ENV_SECRET_KEY,
};

/// 进程配置，启动时从环境变量读取一次，之后只读
#[derive(Clone, validator_derive::Validate)]
pub struct Config {
    #[validate(length(min = 1, message = "DATABASE_URL must not be empty"))]
    pub database_url: String,

    #[validate(length(min = 1, message = "SECRET_KEY must not be empty"))]
    secret_key: String,

    #[validate(length(min = 1, message = "DELIVERY_API_KEY must not be empty"))]
    delivery_api_key: String,

    pub database_echo: bool,

    pub port: u16,

    #[validate(range(min = 4, max = 31, message = "BCRYPT_COST must be between 4 and 31"))]
    pub bcrypt_cost: u32,
}

impl Config {
    /// Builds a validated config, using defaults for everything but the three required values.
    pub fn new(
        database_url: impl Into<String>,
        secret_key: impl Into<String>,
        delivery_api_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let config = Self {
            database_url: trimmed(database_url.into()),
            secret_key: trimmed(secret_key.into()),
            delivery_api_key: trimmed(delivery_api_key.into()),
            database_echo: DEFAULT_DATABASE_ECHO,
            port: DEFAULT_PORT,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    /// 读取环境变量
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(trimmed)
                .ok_or_else(|| anyhow!("Env {name} must be set"))
        };

        let database_echo = match lookup(ENV_DATABASE_ECHO) {
            Some(value) => parse_flag(&value).with_context(|| format!("Env {ENV_DATABASE_ECHO}"))?,
            None => DEFAULT_DATABASE_ECHO,
        };

        let port = match lookup(ENV_PORT) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Env {ENV_PORT} must be a port number, got {value:?}"))?,
            None => DEFAULT_PORT,
        };

        let bcrypt_cost = match lookup(ENV_BCRYPT_COST) {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Env {ENV_BCRYPT_COST} must be an integer, got {value:?}"))?,
            None => bcrypt::DEFAULT_COST,
        };

        let config = Self {
            database_url: required(ENV_DATABASE_URL)?,
            secret_key: required(ENV_SECRET_KEY)?,
            delivery_api_key: required(ENV_DELIVERY_API_KEY)?,
            database_echo,
            port,
            bcrypt_cost,
        };
        config.validate().context("invalid configuration")?;

        Ok(config)
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn delivery_api_key(&self) -> &str {
        &self.delivery_api_key
    }

    /// 默认日志过滤，开启 echo 时输出 SQL 语句
    pub fn default_log_filter(&self) -> &'static str {
        if self.database_echo {
            "delivery_core=debug,sqlx::query=debug"
        } else {
            "delivery_core=debug"
        }
    }

    pub fn with_database_echo(mut self, echo: bool) -> Self {
        self.database_echo = echo;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> anyhow::Result<Self> {
        self.bcrypt_cost = cost;
        self.validate().context("invalid configuration")?;
        Ok(self)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("secret_key", &"*****")
            .field("delivery_api_key", &"*****")
            .field("database_echo", &self.database_echo)
            .field("port", &self.port)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

// Surrounding whitespace in env values is never meaningful, and a blank secret must not pass.
fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}
