use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    app_error::AuthError,
    config::Config,
    constants::{ACCESS_TOKEN_EXPIRE_MINUTES, ALGORITHM},
    model::Keys,
};

/// 签发和校验访问令牌
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<Keys>,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            keys: Arc::new(Keys::new(secret)),
            lifetime: Duration::minutes(ACCESS_TOKEN_EXPIRE_MINUTES),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.secret_key().as_bytes())
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Signs a copy of `claims` with `exp` set to now plus the token lifetime.
    ///
    /// `claims` must serialize to a JSON object. A caller-supplied `exp` is overwritten.
    pub fn create_access_token<T>(&self, claims: &T) -> Result<String, AuthError>
    where
        T: Serialize + ?Sized,
    {
        let mut to_encode = match serde_json::to_value(claims) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("token claims must be an object, got {}", other);
                return Err(AuthError::TokenCreation);
            }
            Err(e) => {
                warn!("failed to serialize token claims: {}", e);
                return Err(AuthError::TokenCreation);
            }
        };

        let expire = (Utc::now() + self.lifetime).timestamp();
        to_encode.insert("exp".to_string(), Value::from(expire));

        debug!(exp = expire, "creating access token");

        encode(&Header::new(ALGORITHM), &to_encode, &self.keys.encoding).map_err(|e| {
            warn!("failed to encode access token: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Verifies signature and expiry, returning the embedded claims.
    pub fn decode_access_token(&self, token: &str) -> Result<Map<String, Value>, AuthError> {
        decode::<Map<String, Value>>(token, &self.keys.decoding, &Validation::new(ALGORITHM))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("rejected access token: {}", e);
                AuthError::InvalidToken
            })
    }
}

/// 提取器，从 Bearer 令牌中取出 claims
#[derive(Debug, Clone)]
pub struct AccessClaims(pub Map<String, Value>);

impl AccessClaims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AccessClaims
where
    TokenIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let issuer = TokenIssuer::from_ref(state);
        let claims = issuer.decode_access_token(bearer.token())?;

        Ok(AccessClaims(claims))
    }
}
