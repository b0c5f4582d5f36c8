//! Poll voting web application.
//!
//! Users browse the list of polls, vote for an option and look at the results
//! as an HTML table, a pie chart and a downloadable spreadsheet.
//!
//! # Layout
//! - [`dao`]: every SQL statement, behind [`dao::SqlDao`]
//! - [`db`]: pool creation and table bootstrap
//! - [`seed`]: polls loaded from `.properties` files at startup
//! - [`properties`]: the `.properties` reader shared by seeding and [`config`]
//! - [`handlers`], [`routes`]: the axum surface
//! - [`chart`], [`export`], [`views`]: PNG, XLSX and HTML rendering
//!
//! # Configuration
//! | Variable | Default | |
//! |---|---|---|
//! | `PORT` | `3030` | listen port |
//! | `DATABASE_URL` | | overrides the settings file |
//! | `POLL_DB_SETTINGS` | `dbsettings.properties` | `host`, `port`, `name`, `user`, `password` |
//! | `POLLS_DIR` | `polls` | seed directory |
//! | `POLL_DB_MAX_CONNECTIONS` | `5` | pool size |
pub mod chart;
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod export;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod properties;
pub mod routes;
pub mod seed;
pub mod state;
pub mod views;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{config::Config, dao::SqlDao, db::Backend, state::AppState};

pub async fn start_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load environment variables from .env file

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().context("Environment misconfigured")?;

    let pool = db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to the database")?;
    let dao = SqlDao::new();

    {
        let mut conn = pool.acquire().await.context("Database is currently unavailable")?;
        db::create_tables(&mut conn, Backend::from_url(&config.database_url)).await?;
        seed::load_polls(&dao, &mut conn, &config.polls_dir).await?;
    }

    let app = routes::create_routes(AppState::new(pool.clone(), dao));

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
