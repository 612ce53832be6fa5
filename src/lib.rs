#[macro_use]
extern crate diesel;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod validation;

use config::Config;
use store::{MemoryStore, PgStore, SharedStore};

const PAYLOAD_LIMIT: usize = 4 * 1024 * 1024;

pub fn init_logger() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,actix_web=info"),
    )
    .init();
}

pub fn create_store(config: &Config) -> Result<SharedStore> {
    match &config.database_url {
        Some(database_url) => {
            let pool = db::create_connection_pool(database_url, config.pool_size)?;
            info!("storing articles in PostgreSQL");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL is not set, articles are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run() -> Result<()> {
    init_logger();
    let config = Config::from_env()?;
    let store = create_store(&config)?;
    let bind_address = config.bind_address.clone();
    info!("listening on {}", bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::new()
                    .allowed_origin(&config.allowed_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["X-Requested-With", "Content-Type", "Authorization"])
                    .max_age(3600)
                    .finish(),
            )
            .data(store.clone())
            .data(config.clone())
            .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;
    Ok(())
}
