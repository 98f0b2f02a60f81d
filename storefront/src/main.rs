// storefront/src/main.rs

use garage_storefront::config::{AppConfig, LogFormat, StoreBackend};
use garage_storefront::errors::{AppError, Result as AppResult};
use garage_storefront::services::seed::seed_demo_catalog;
use garage_storefront::services::{R2Signer, SupabaseAuth};
use garage_storefront::state::AppState;
use garage_storefront::store::{CatalogStore, MemoryStore, PgStore};
use garage_storefront::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // RUST_LOG overrides the default level
    .with_span_events(FmtSpan::CLOSE);
  match LogFormat::from_env() {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

async fn open_store(config: &AppConfig) -> AppResult<Arc<dyn CatalogStore>> {
  let store: Arc<dyn CatalogStore> = match config.store_backend {
    StoreBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
      let pg = PgStore::connect(database_url).await?;
      tracing::info!("Successfully connected to the database.");
      if config.run_migrations {
        pg.migrate().await?;
        tracing::info!("Database migrations applied.");
      }
      Arc::new(pg)
    }
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  if config.seed_db {
    seed_demo_catalog(store.as_ref()).await?;
  }
  Ok(store)
}

async fn build_state() -> AppResult<AppState> {
  let config = AppConfig::from_env()?;
  let store = open_store(&config).await?;
  let sessions = Arc::new(SupabaseAuth::new(&config.supabase_url, &config.supabase_anon_key)?);
  let uploads = Arc::new(R2Signer::new(&config.object_store));
  Ok(AppState::new(config, store, sessions, uploads))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();
  tracing::info!("Starting garage sale storefront server...");

  let app_state = build_state().await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise the application.");
    std::io::Error::other(e.to_string())
  })?;

  let server_address = app_state.config.server_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
