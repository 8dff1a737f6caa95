use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;

mod api;
mod auth;
mod clock;
mod config;
mod docs;
mod eligibility;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;
mod workflow;

use config::Config;

use crate::clock::SystemClock;
use crate::docs::ApiDoc;
use crate::service::HrService;
use crate::utils::refresh_tokens::RefreshTokens;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRMS workflow service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let service = Data::new(HrService::new(config.policy.clone(), Arc::new(SystemClock)));
    match &config.bootstrap_admin_password {
        Some(password) => {
            service
                .seed_admin(&config.bootstrap_admin_username, password)
                .map_err(|e| anyhow::anyhow!("Failed to seed admin account: {}", e))?;
        }
        None => warn!("BOOTSTRAP_ADMIN_PASSWORD not set; no account can log in"),
    }

    let tokens = Data::new(RefreshTokens::new(config.refresh_token_ttl));

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service.clone())
            .app_data(tokens.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
