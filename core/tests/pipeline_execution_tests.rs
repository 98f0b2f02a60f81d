// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use garage_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("step1", false), ("step2", false), ("step3", false)]);
  pipeline.on_step("step1", recording_handler("step1"));
  pipeline.on_step("step2", recording_handler("step2"));
  pipeline.on_step("step3", recording_handler("step3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_multiple_handlers_on_one_step_run_in_registration_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("only", false)]);
  pipeline.on_step("only", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().ledger.push(1);
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });
  pipeline.on_step("only", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().ledger.push(2);
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().ledger, vec![1, 2]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("stepA", false), ("stopStep", false), ("stepC", false)]);
  pipeline.on_step("stepA", recording_handler("stepA"));
  pipeline.on_step("stopStep", recording_handler("stopStep"));
  pipeline.on_step("stepC", recording_handler("stepC"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("stopStep".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().steps_executed, vec!["stepA", "stopStep"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("good_step", false), ("bad_step", false), ("another_step", false)]);
  pipeline.on_step("good_step", recording_handler("good_step"));
  pipeline.on_step("bad_step", failing_handler("bad_step", "I am a bad step!"));
  pipeline.on_step("another_step", recording_handler("another_step"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TestError::Handler("I am a bad step!".to_string())));
  assert_eq!(ctx.read().steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("first", false), ("notify", true), ("last", false)]);
  pipeline.on_step("first", recording_handler("first"));
  pipeline.on_step("last", recording_handler("last"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().steps_executed, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn test_missing_handler_is_reported_before_any_step_runs() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("write", false), ("missing", false)]);
  pipeline.on_step("write", recording_handler("write"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected TestError::Flow(HandlerMissing), got {:?}", other),
  }
  assert!(ctx.read().steps_executed.is_empty(), "no step may run on a misconfigured pipeline");
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_flow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new(&[("task", false)]);
  pipeline.on_step("task", |_ctx: ContextData<TestContext>| {
    Box::pin(async move { Err::<PipelineControl, _>(FlowError::Internal("Intentional FlowError".to_string())) })
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result {
    Err(FlowError::Internal(s)) => assert_eq!(s, "Intentional FlowError"),
    other => panic!("Expected FlowError::Internal, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "step 'nope' not found")]
fn test_registering_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("real", false)]);
  pipeline.on_step("nope", recording_handler("nope"));
}
