use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::{pool::PoolConnection, Any, AnyPool};

use crate::{dao::SqlDao, error::{AppError, DaoError}};

pub struct AppState {
    pub pool: AnyPool,
    pub dao: SqlDao,
}

impl AppState {
    pub fn new(pool: AnyPool, dao: SqlDao) -> Arc<Self> {
        Arc::new(Self { pool, dao })
    }
}

/// Pooled connection bound to a single request.
///
/// Acquired before the handler runs and handed back to the pool when the
/// handler drops it.
pub struct DbConn(pub PoolConnection<Any>);

impl FromRequestParts<Arc<AppState>> for DbConn {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let conn = state
            .pool
            .acquire()
            .await
            .map_err(DaoError::storage("Database is currently unavailable."))?;
        Ok(Self(conn))
    }
}
