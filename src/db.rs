// src/db.rs
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::{AnyConnection, AnyPool};
use tracing::info;

use crate::error::DaoError;

/// SQL dialect, picked from the scheme of the database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("sqlite:") {
            Backend::Sqlite
        } else {
            Backend::Postgres
        }
    }

    fn create_polls(self) -> &'static str {
        match self {
            Backend::Postgres => {
                "CREATE TABLE IF NOT EXISTS polls (
                    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
                    title VARCHAR(150) NOT NULL,
                    message TEXT NOT NULL
                )"
            }
            Backend::Sqlite => {
                "CREATE TABLE IF NOT EXISTS polls (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    message TEXT NOT NULL
                )"
            }
        }
    }

    fn create_poll_options(self) -> &'static str {
        match self {
            Backend::Postgres => {
                "CREATE TABLE IF NOT EXISTS poll_options (
                    id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
                    option_title VARCHAR(100) NOT NULL,
                    option_link VARCHAR(150) NOT NULL,
                    poll_id BIGINT NOT NULL REFERENCES polls(id),
                    votes_count BIGINT NOT NULL DEFAULT 0
                )"
            }
            Backend::Sqlite => {
                "CREATE TABLE IF NOT EXISTS poll_options (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    option_title TEXT NOT NULL,
                    option_link TEXT NOT NULL,
                    poll_id INTEGER NOT NULL REFERENCES polls(id),
                    votes_count INTEGER NOT NULL DEFAULT 0
                )"
            }
        }
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<AnyPool, sqlx::Error> {
    install_default_drivers();

    AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Creates `polls` and `poll_options` unless they already exist.
pub async fn create_tables(conn: &mut AnyConnection, backend: Backend) -> Result<(), DaoError> {
    sqlx::query(backend.create_polls())
        .execute(&mut *conn)
        .await
        .map_err(DaoError::storage("Exception while creating polls table."))?;

    sqlx::query(backend.create_poll_options())
        .execute(&mut *conn)
        .await
        .map_err(DaoError::storage("Exception while creating poll_options table."))?;

    info!(?backend, "Database tables ready");
    Ok(())
}
