use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{
    config::Config, db::Database, delivery::DeliveryKeyGuard, password::PasswordHasher,
    token::TokenIssuer,
};

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// 应用状态，所有依赖在启动时构造一次后注入
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub tokens: TokenIssuer,
    pub passwords: PasswordHasher,
    pub delivery: DeliveryKeyGuard,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            tokens: TokenIssuer::from_config(&config),
            passwords: PasswordHasher::from_config(&config),
            delivery: DeliveryKeyGuard::from_config(&config),
            config: Arc::new(config),
            db,
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for PasswordHasher {
    fn from_ref(state: &AppState) -> Self {
        state.passwords
    }
}

impl FromRef<AppState> for DeliveryKeyGuard {
    fn from_ref(state: &AppState) -> Self {
        state.delivery.clone()
    }
}
