// tests/registry_tests.rs
mod common;

use common::*;
use carshare_core::{ContextData, Pipeline, PipelineControl, PipelineResult, WorkflowError, Workflows};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SignupContext {
  email: String,
  normalized: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct PayoutContext {
  amount_cents: i64,
}

#[derive(Clone, Debug, Default)]
struct NeverRegistered;

#[tokio::test]
async fn test_registry_runs_the_pipeline_for_each_context_type() {
  setup_tracing();
  let workflows = Workflows::<TestError>::new();

  let mut signup = Pipeline::<SignupContext, TestError>::new("signup", &[("normalize", false)]);
  signup.on("normalize", |ctx: ContextData<SignupContext>| async move {
    let mut guard = ctx.write();
    guard.email = guard.email.trim().to_lowercase();
    guard.normalized = true;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  workflows.register(signup);

  let mut payout = Pipeline::<PayoutContext, TestError>::new("payout_request", &[("double", false)]);
  payout.on("double", |ctx: ContextData<PayoutContext>| async move {
    ctx.write().amount_cents *= 2;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  workflows.register(payout);

  assert!(workflows.is_registered::<SignupContext>());
  assert!(!workflows.is_registered::<NeverRegistered>());
  assert_eq!(workflows.pipeline_names(), vec!["payout_request", "signup"]);

  let signup_ctx = ContextData::new(SignupContext {
    email: "  Client@Example.COM ".to_string(),
    normalized: false,
  });
  assert_eq!(workflows.run(signup_ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(
    signup_ctx.snapshot(),
    SignupContext {
      email: "client@example.com".to_string(),
      normalized: true
    }
  );

  let payout_ctx = ContextData::new(PayoutContext { amount_cents: 150 });
  workflows.run(payout_ctx.clone()).await.unwrap();
  assert_eq!(payout_ctx.read().amount_cents, 300);
}

#[tokio::test]
async fn test_registry_pipeline_not_registered() {
  setup_tracing();
  let workflows = Workflows::<TestError>::new();
  let result = workflows.run(ContextData::new(NeverRegistered)).await;

  match result {
    Err(TestError::Workflow(msg)) => {
      assert!(msg.contains("PipelineNotRegistered"));
      assert!(msg.contains("NeverRegistered"));
    }
    other => panic!("expected PipelineNotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn test_registering_again_replaces_the_pipeline() {
  setup_tracing();
  let workflows = Workflows::<TestError>::new();

  let mut first = Pipeline::<PayoutContext, TestError>::new("v1", &[("set", false)]);
  first.on("set", |ctx: ContextData<PayoutContext>| async move {
    ctx.write().amount_cents = 1;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  workflows.register(first);

  let mut second = Pipeline::<PayoutContext, TestError>::new("v2", &[("set", false)]);
  second.on("set", |ctx: ContextData<PayoutContext>| async move {
    ctx.write().amount_cents = 2;
    Ok::<_, TestError>(PipelineControl::Continue)
  });
  workflows.register(second);

  let ctx = ContextData::new(PayoutContext::default());
  workflows.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().amount_cents, 2);
  assert_eq!(workflows.pipeline_names(), vec!["v2"]);
}

#[tokio::test]
async fn test_default_registry_error_type_is_workflow_error() {
  setup_tracing();
  let workflows: Workflows = Workflows::default();
  let result = workflows.run(ContextData::new(NeverRegistered)).await;
  assert!(matches!(result, Err(WorkflowError::PipelineNotRegistered { .. })));
}
