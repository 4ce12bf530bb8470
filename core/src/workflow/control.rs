// core/src/workflow/control.rs

//! Flow signals returned by handlers and the outcome of a whole run.

/// Returned by a handler to let the run go on or halt it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halts the run. Nothing after this handler executes.
  Stop,
}

/// Outcome of `Pipeline::run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step that was not skipped ran to the end.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}
