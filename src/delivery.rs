use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{app_error::AuthError, config::Config, constants::DELIVERY_KEY_HEADER};

/// 配送接口的静态密钥校验
#[derive(Clone)]
pub struct DeliveryKeyGuard {
    key: Arc<str>,
}

impl DeliveryKeyGuard {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.delivery_api_key())
    }

    /// Returns `Ok(true)` when `header_value` equals the configured key.
    pub fn verify_delivery_key(&self, header_value: &str) -> Result<bool, AuthError> {
        if constant_time_eq(header_value.as_bytes(), self.key.as_bytes()) {
            Ok(true)
        } else {
            warn!("rejected request with invalid delivery key");
            Err(AuthError::InvalidDeliveryKey)
        }
    }
}

// Length is not hidden, only the position of the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// 提取器，校验 x-api-key 请求头
#[derive(Debug, Clone, Copy)]
pub struct DeliveryKey;

#[async_trait]
impl<S> FromRequestParts<S> for DeliveryKey
where
    DeliveryKeyGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(DELIVERY_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                warn!("missing {} header", DELIVERY_KEY_HEADER);
                AuthError::MissingDeliveryKey
            })?;

        DeliveryKeyGuard::from_ref(state).verify_delivery_key(header_value)?;

        Ok(DeliveryKey)
    }
}
