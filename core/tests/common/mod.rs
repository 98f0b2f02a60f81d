// tests/common/mod.rs
#![allow(dead_code)]

use garage_flow::{ContextData, FlowError, PipelineControl};
use once_cell::sync::Lazy;
use std::future::Future;
use std::pin::Pin;
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub steps_executed: Vec<String>,
  pub compensated: Vec<String>,
  pub should_stop_at: Option<String>,
  pub ledger: Vec<u32>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Flow framework error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

pub type StepFuture<T> = Pin<Box<dyn Future<Output = Result<T, TestError>> + Send>>;

/// Records the step name and, when asked to, stops the pipeline there.
pub fn recording_handler(step_name: &'static str) -> impl Fn(ContextData<TestContext>) -> StepFuture<PipelineControl> {
  move |ctx: ContextData<TestContext>| -> StepFuture<PipelineControl> {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn failing_handler(
  step_name: &'static str,
  message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> StepFuture<PipelineControl> {
  move |ctx: ContextData<TestContext>| -> StepFuture<PipelineControl> {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  }
}

pub fn recording_compensator(step_name: &'static str) -> impl Fn(ContextData<TestContext>) -> StepFuture<()> {
  move |ctx: ContextData<TestContext>| -> StepFuture<()> {
    Box::pin(async move {
      ctx.write().compensated.push(step_name.to_string());
      Ok(())
    })
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
