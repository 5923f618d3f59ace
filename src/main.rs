//! Sheetserve - serve a Google Sheet as a cached JSON API
//!
//! Fetches a spreadsheet export, normalizes it into field-keyed records, and
//! serves it over HTTP with a time-bounded in-memory cache in front of the
//! fetch path.

use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sheetserve::api;
use sheetserve::config::Config;
use sheetserve::service::DataService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let port = config.port;
    let service = web::Data::new(DataService::new(&config));

    info!(port, "API server starting");
    info!("- GET  /api/data          : full normalized dataset");
    info!("- GET  /api/fields        : available fields");
    info!("- GET  /api/data/{{field}}  : single column values");
    info!("- POST /api/refresh       : force cache refresh");
    info!("- GET  /api/health        : cache health");
    info!("- GET  /api/ads           : formatted ads");

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .configure(api::routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
