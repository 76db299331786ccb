use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod config;
mod db;
mod docs;
mod model;
mod pdf;
mod report;
mod repository;
mod routes;
mod utils;

use crate::api::report::ReportContext;
use crate::config::Config;
use crate::db::init_db;
use crate::docs::ApiDoc;
use crate::pdf::{ChromiumRenderer, PdfRenderer};
use crate::repository::payroll::{MySqlPayrollSource, PayrollSource};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Welcome to the Wage Register API! Use /api/corporate-data-params to generate a report."
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    info!(max_connections = config.db_max_connections, "Connected to MySQL");

    std::fs::create_dir_all(&config.reports_dir)
        .with_context(|| format!("failed to create {}", config.reports_dir.display()))?;

    let source: Arc<dyn PayrollSource> = Arc::new(MySqlPayrollSource::new(pool));
    let renderer: Arc<dyn PdfRenderer> = Arc::new(ChromiumRenderer::new(
        config.chrome_bin.clone(),
        config.render_budget_ms,
    ));
    let source = Data::from(source);
    let renderer = Data::from(renderer);
    let reports = Data::new(ReportContext::from_config(&config).context("failed to load report template")?);

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, reports_dir = %config.reports_dir.display(), "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(source.clone())
            .app_data(renderer.clone())
            .app_data(reports.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
