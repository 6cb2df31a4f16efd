use std::{
    ops::{Deref, DerefMut},
    str::FromStr,
};

use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use sqlx::{
    any::{Any, AnyConnectOptions, AnyPoolOptions},
    pool::PoolConnection,
    AnyConnection, AnyPool, ConnectOptions, Connection, Transaction,
};
use tracing::debug;
use uuid::Uuid;

use crate::{app_error::AppError, config::Config};

/// 数据库连接池，可在多个请求间共享
#[derive(Clone, Debug)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connects eagerly so a bad `DATABASE_URL` fails at startup.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        sqlx::any::install_default_drivers();

        let mut options = AnyConnectOptions::from_str(&config.database_url)
            .context("invalid DATABASE_URL")?;
        if !config.database_echo {
            options = options.disable_statement_logging();
        }

        let pool = AnyPoolOptions::new()
            .connect_with(options)
            .await
            .context("failed to connect to database")?;

        debug!("database pool ready");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// 创建会话
    pub async fn session(&self) -> Result<Session, sqlx::Error> {
        let conn = self.pool.acquire().await?;
        let id = Uuid::new_v4();
        debug!(session_id = %id, "opened database session");
        Ok(Session { id, conn })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// One unit of work on a pooled connection. Dropping it returns the connection to the pool.
pub struct Session {
    id: Uuid,
    conn: PoolConnection<Any>,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn begin(&mut self) -> Result<Transaction<'_, Any>, sqlx::Error> {
        self.conn.begin().await
    }
}

impl Deref for Session {
    type Target = AnyConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(session_id = %self.id, "released database session");
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = Database::from_ref(state);
        Ok(db.session().await?)
    }
}
