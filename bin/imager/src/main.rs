//! # Imager Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod settings;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use imager_api::{configure_routes, middleware, AppState};
use imager_core::ImagerService;

use crate::settings::Settings;

#[cfg(feature = "db-sqlite")]
use imager_db_sqlite::SqliteImagerRepo;

#[cfg(feature = "auth-simple")]
use imager_auth_simple::Argon2Credentials;

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("imager needs a storage plugin (db-sqlite) and a credential plugin (auth-simple)");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::new().context("failed to load settings")?;

    // 1. Storage
    let repo = SqliteImagerRepo::new(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to open {}", settings.database.url))?;

    // 2. Credentials
    let credentials = Argon2Credentials::new();

    let state = web::Data::new(AppState {
        service: ImagerService::new(Arc::new(repo), Arc::new(credentials)),
    });

    let addr = (settings.server.host.clone(), settings.server.port);
    log::info!("imager listening on http://{}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .wrap(middleware::security_headers())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
