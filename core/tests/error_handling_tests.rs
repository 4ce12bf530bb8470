// tests/error_handling_tests.rs
mod common;

use common::*;
use carshare_core::{ContextData, DomainError, Pipeline, PipelineControl, WorkflowError};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new("incomplete", &[("missing", false)]);
  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Workflow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
      assert!(s.contains("incomplete"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_workflow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, WorkflowError>::new("anyhow_flow", &[("task", false)]);
  pipeline.on("task", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(anyhow::anyhow!("payment gateway declined"))
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result {
    Err(WorkflowError::HandlerError { source }) => {
      assert_eq!(source.to_string(), "payment gateway declined");
    }
    other => panic!("expected HandlerError, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_handler_error_converts_into_pipeline_error() {
  setup_tracing();

  #[derive(Debug, thiserror::Error)]
  enum FlowError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Domain(#[from] DomainError),
  }

  let mut pipeline = Pipeline::<TestContext, FlowError>::new("domain_flow", &[("validate", false)]);
  pipeline.on("validate", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(DomainError::EndBeforeStart)
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  assert!(matches!(result, Err(FlowError::Domain(DomainError::EndBeforeStart))));
}

#[test]
fn test_error_messages_are_user_facing() {
  assert_eq!(
    DomainError::EndBeforeStart.to_string(),
    "End date must be later than start date."
  );
  assert_eq!(
    DomainError::StartInPast.to_string(),
    "Cannot book a date in the past."
  );
  let missing = WorkflowError::HandlerMissing {
    pipeline: "booking".to_string(),
    step_name: "reserve".to_string(),
  };
  assert_eq!(
    missing.to_string(),
    "Handler missing for required step 'reserve' in pipeline 'booking'"
  );
}
