// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::{SessionVerifier, UploadSigner};
use crate::store::CatalogStore;
use garage_flow::Flows;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn CatalogStore>,
  pub flows: Arc<Flows<AppError>>,
  pub sessions: Arc<dyn SessionVerifier>,
  pub uploads: Arc<dyn UploadSigner>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the collaborators together and registers every pipeline.
  pub fn new(
    config: AppConfig,
    store: Arc<dyn CatalogStore>,
    sessions: Arc<dyn SessionVerifier>,
    uploads: Arc<dyn UploadSigner>,
  ) -> Self {
    let flows = Flows::<AppError>::new();
    pipelines::register_all_pipelines(&flows);

    Self {
      store,
      flows: Arc::new(flows),
      sessions,
      uploads,
      config: Arc::new(config),
    }
  }
}
