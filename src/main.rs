use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use store::{HistoryStore, PgHistoryStore};

mod config;
mod conversion_record;
mod converter;
mod form;
mod page;
mod routes;
mod service;
mod store;

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = config::load_env_file(None);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = env_file {
        log::warn!("Ignoring unreadable .env file: {}", e);
    }

    let config = config::Config::from_env().context("Can't load configuration")?;

    let store = Arc::new(PgHistoryStore::connect_lazy(&config.store));
    if let Err(e) = store.initialize().await {
        log::error!("Error initializing database, history is unavailable: {}", e);
    }
    store.check_connection().await;

    let state = web::Data::new(routes::AppState {
        service: service::ConversionService::new(store.clone()),
        server: form::ServerInfo::detect(),
    });

    log::info!("Server running on port {}", config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", config.port))
    .with_context(|| format!("Can't bind port {}", config.port))?
    .run()
    .await?;

    store.close().await;
    log::info!("Database pool closed");

    Ok(())
}
