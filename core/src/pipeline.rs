// garage_flow/src/pipeline.rs

//! The `Pipeline<TData, Err>` type: step definitions, handler registration and
//! execution with reverse-order compensation.

use crate::context::{Compensator, ContextData, Handler};
use crate::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use std::collections::HashMap;
use std::future::Future;
use tracing::{event, info_span, instrument, Instrument, Level};

/// A named step and whether it may be left without handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}

/// An ordered list of steps over the context type `TData`.
///
/// `Err` is what handlers return; it must be constructible from `FlowError` so
/// the engine can report its own misconfiguration through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  steps: Vec<StepDef>,
  on: HashMap<String, Vec<Handler<TData, Err>>>,
  compensators: HashMap<String, Compensator<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(step_name, optional)` pairs.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
      compensators: HashMap::new(),
    }
  }

  pub fn steps(&self) -> &[StepDef] {
    &self.steps
  }

  /// # Panics
  /// When `step_name` is not part of the definition. This is a wiring mistake
  /// made at startup, not a runtime condition.
  fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("garage-flow setup error: step '{}' not found in pipeline definition.", step_name);
    }
  }

  /// Registers a handler for `step_name`. Multiple handlers run in registration order.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers the undo logic for `step_name`, replacing any earlier one.
  ///
  /// It runs only if `step_name` completed and a later step then failed.
  pub fn compensate_step<F, UserErr>(
    &mut self,
    step_name: &str,
    compensator_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensator: Compensator<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = compensator_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.compensators.insert(step_name.to_string(), compensator);
  }

  fn has_handlers(&self, step_name: &str) -> bool {
    self.on.get(step_name).is_some_and(|v| !v.is_empty())
  }

  /// Executes every step against `ctx_data`.
  ///
  /// A missing handler on a non-optional step is reported before anything runs.
  /// When a handler fails, completed steps are compensated last-first and the
  /// handler's error is returned. Compensation failures are logged, not returned.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    if let Some(step) = self.steps.iter().find(|s| !s.optional && !self.has_handlers(&s.name)) {
      event!(Level::ERROR, step_name = %step.name, "Non-optional step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step.name.clone(),
      }));
    }

    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let Some(handlers) = self.on.get(step_name).filter(|v| !v.is_empty()) else {
        event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
        continue;
      };

      let step_span = info_span!("pipeline_step", step_name, step_index = step_idx);
      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, step_name, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(Level::ERROR, step_name, error = %e, "Step handler failed.");
            self.compensate(&completed, &ctx_data).await;
            return Err(e);
          }
        }
      }
      completed.push(step_name);
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn compensate(&self, completed: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensator) = self.compensators.get(*step_name) else {
        continue;
      };
      event!(Level::WARN, step_name, "Compensating completed step.");
      if let Err(e) = compensator(ctx_data.clone()).await {
        event!(Level::ERROR, step_name, error = %e, "Compensation failed; state may be inconsistent.");
      }
    }
  }
}

impl<TData, Err> std::fmt::Debug for Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("steps", &self.steps)
      .field("compensated_steps", &self.compensators.keys().collect::<Vec<_>>())
      .finish()
  }
}
