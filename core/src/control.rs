// garage_flow/src/control.rs

//! Signals for controlling pipeline flow and the outcome of a run.

/// Returned by a handler to continue or halt the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the pipeline. Remaining handlers and steps do not run and nothing
  /// is compensated: stopping is a business decision, not a failure.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
