// storefront/src/pipelines/mod.rs

//! The multi-write workflows of the storefront, built on `garage_flow`.

use crate::errors::AppError;
use garage_flow::Flows;

pub mod contexts;

pub mod checkout_pipeline;
pub mod verification_pipeline;

/// Registers every storefront pipeline. Called once at startup.
pub fn register_all_pipelines(flows: &Flows<AppError>) {
  tracing::info!("Registering storefront pipelines...");

  checkout_pipeline::register_checkout_pipeline(flows);
  verification_pipeline::register_verification_pipeline(flows);

  tracing::info!("All storefront pipelines registered.");
}
