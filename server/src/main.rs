// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use carshare_core::Workflows;
use carshare_server::config::AppConfig;
use carshare_server::errors::AppError;
use carshare_server::state::AppState;
use carshare_server::{db, pipelines, telemetry, web};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  dotenvy::dotenv().ok();
  telemetry::init_tracing(telemetry::log_format_from_env(), "info,sqlx=warn");

  tracing::info!("Starting car-sharing server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let db_pool = match db::connect(&app_config.database_url, app_config.database_max_connections).await {
    Ok(pool) => pool,
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()));
    }
  };

  if app_config.run_migrations {
    if let Err(e) = db::run_migrations(&db_pool).await {
      tracing::error!(error = %e, "Failed to apply migrations.");
      return Err(std::io::Error::other(e.to_string()));
    }
  }

  if app_config.seed_db {
    match db::seed::seed(&db_pool, false).await {
      Ok(report) => tracing::info!(users = report.users_created, cars = report.cars_created, "Database seeded."),
      Err(e) => tracing::error!(error = %e, "Failed to seed database."),
    }
  }

  let workflows = Arc::new(Workflows::<AppError>::new());
  pipelines::register_all_pipelines(&workflows);

  let app_state = AppState {
    db_pool,
    workflows,
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(actix_data::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid JSON body: {}", err)).into()
      }))
      .app_data(actix_data::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid query string: {}", err)).into()
      }))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
