// core/src/workflow/execution.rs

//! `Pipeline::run`: walks the steps in order and drives their before/on/after handlers.

use crate::error::WorkflowError;
use crate::workflow::context_data::ContextData;
use crate::workflow::control::{PipelineControl, PipelineResult};
use crate::workflow::pipeline::{Phase, Pipeline};
use tracing::{event, info_span, Instrument, Level};

/// What a single phase of a step ended with.
enum PhaseOutcome<Err> {
  Continue,
  Stop,
  Failed(Err),
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// A required step that has no handlers fails with `WorkflowError::HandlerMissing`.
  /// An optional step whose handler fails is logged and the run moves to the next step.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    let run_span = info_span!("pipeline_run", pipeline = %self.name, num_steps = self.steps.len());
    self.run_steps(ctx_data).instrument(run_span).await
  }

  async fn run_steps(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step = step_name, "Step skipped by its skip condition.");
          continue;
        }
      }

      let has_handlers = [Phase::Before, Phase::On, Phase::After]
        .iter()
        .any(|phase| !self.handlers_for(step_name, *phase).is_empty());

      if !has_handlers {
        if step_def.optional {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step = step_name, "Required step has no handlers.");
        return Err(Err::from(WorkflowError::HandlerMissing {
          pipeline: self.name.clone(),
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = info_span!(
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let outcome = self.run_step(step_name, ctx_data.clone()).instrument(step_span).await;
      match outcome {
        PhaseOutcome::Continue => {}
        PhaseOutcome::Stop => {
          event!(Level::INFO, step = step_name, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped);
        }
        PhaseOutcome::Failed(e) if step_def.optional => {
          event!(Level::WARN, step = step_name, error = %e, "Optional step failed, continuing.");
        }
        PhaseOutcome::Failed(e) => {
          event!(Level::ERROR, step = step_name, error = %e, "Step failed.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_name: &str, ctx_data: ContextData<TData>) -> PhaseOutcome<Err> {
    for phase in [Phase::Before, Phase::On, Phase::After] {
      for (handler_idx, handler_fn) in self.handlers_for(step_name, phase).iter().enumerate() {
        event!(Level::TRACE, phase = phase.label(), handler_index = handler_idx, "Executing handler.");
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => return PhaseOutcome::Stop,
          Err(e) => return PhaseOutcome::Failed(e),
        }
      }
    }
    PhaseOutcome::Continue
  }
}
