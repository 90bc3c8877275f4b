use actix_web::{App, HttpServer, middleware, web};

use caseflow::audit;
use caseflow::config::AppConfig;
use caseflow::db::Store;
use caseflow::errors::AppError;
use caseflow::handlers::{self, AppState};

fn startup_error(e: AppError) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(startup_error)?;

    // Connect and migrate; without DATABASE_URL everything stays in memory
    let store = Store::connect(&config).await.map_err(startup_error)?;
    store.run_migrations().await.map_err(startup_error)?;

    // Clean up old audit entries based on retention policy
    if let Err(e) = audit::cleanup_old_entries(&store, config.audit_retention_days).await {
        log::warn!("Audit cleanup failed: {e}");
    }

    let engine = store
        .load_engine(config.business_offset)
        .await
        .map_err(startup_error)?;
    let state = web::Data::new(AppState::new(engine, store));

    log::info!(
        "Starting server at http://{} (business offset {})",
        config.bind_addr,
        config.business_offset
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
