use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use taskify::clock::SystemClock;
use taskify::config::{Config, DataBackend};
use taskify::docs::ApiDoc;
use taskify::gateway::DataGateway;
use taskify::gateway::memory::MemoryGateway;
use taskify::gateway::mysql::MySqlGateway;
use taskify::gateway::rest::RestGateway;
use taskify::routes::{self, RateLimits};
use taskify::state::AppState;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

async fn build_gateway(backend: &DataBackend) -> anyhow::Result<Arc<dyn DataGateway>> {
    Ok(match backend {
        DataBackend::MySql {
            database_url,
            run_migrations,
        } => {
            let gateway = MySqlGateway::connect(database_url)
                .await
                .context("Failed to connect to database")?;
            if *run_migrations {
                gateway.migrate().await.context("Failed to run migrations")?;
                info!("Migrations applied");
            }
            Arc::new(gateway)
        }
        DataBackend::Rest {
            service_url,
            service_key,
        } => Arc::new(RestGateway::new(service_url.clone(), service_key.clone())),
        DataBackend::Memory => {
            warn!("Using the in-memory data backend; nothing is persisted");
            Arc::new(MemoryGateway::new())
        }
    })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let gateway = build_gateway(&config.data_backend).await?;
    let state = AppState::new(
        gateway,
        Arc::new(SystemClock),
        config.refresh_token_ttl as u64,
    );
    let limits = RateLimits::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(state.clone()))
            // auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config, &limits))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
