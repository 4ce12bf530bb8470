// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use carshare_core::{ContextData, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new("ordered", &[("step1", false), ("step2", false), ("step3", false)]);

  pipeline.on("step1", create_simple_handler("step1", " S1"));
  pipeline.on("step2", create_simple_handler("step2", " S2"));
  pipeline.on("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Completed));
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("phases", &[("only", false)]);

  pipeline.after("only", create_simple_handler("after", "[after]"));
  pipeline.on("only", create_simple_handler("on", "[on]"));
  pipeline.before("only", create_simple_handler("before", "[before]"));
  pipeline.on("only", create_simple_handler("on2", "[on2]"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().message, "[before][on][on2][after]");
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new("stopping", &[("stepA", false), ("stopStep", false), ("stepC", false)]);

  pipeline.on("stepA", create_simple_handler("stepA", "A"));
  pipeline.on("stopStep", |ctx: ContextData<TestContext>| async move {
    ctx.write().steps_executed.push("stopStep".to_string());
    Ok::<_, TestError>(PipelineControl::Stop)
  });
  pipeline.on("stepC", create_simple_handler("stepC", "C"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Stopped));
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.steps_executed, vec!["stepA", "stopStep"]);
}

#[tokio::test]
#[serial]
async fn test_stop_requested_through_context() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("ctx_stop", &[("a", false), ("b", false)]);
  pipeline.on("a", create_simple_handler("a", "A"));
  pipeline.on("b", create_simple_handler("b", "B"));

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("a".to_string()),
    ..Default::default()
  });
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().message, "A");
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(
    "failing",
    &[("good_step", false), ("bad_step", false), ("another_step", false)],
  );

  pipeline.on("good_step", create_simple_handler("good_step", "Good"));
  pipeline.on("bad_step", create_failing_handler("bad_step", "car unavailable"));
  pipeline.on("another_step", create_simple_handler("another_step", "NeverRun"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TestError::Handler("car unavailable".to_string())));
  let guard = ctx.read();
  assert_eq!(guard.message, "Good");
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_failure_does_not_halt_the_run() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new("optional", &[("first", false), ("notify", true), ("last", false)]);

  pipeline.on("first", create_simple_handler("first", "1"));
  pipeline.on("notify", create_failing_handler("notify", "mail server down"));
  pipeline.on("last", create_simple_handler("last", "3"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().steps_executed, vec!["first", "notify", "last"]);
  assert_eq!(ctx.read().message, "13");
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("gaps", &[("a", false), ("hook", true)]);
  pipeline.on("a", create_simple_handler("a", "A"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().counter, 1);
}

#[tokio::test]
#[serial]
async fn test_pipeline_skips_step_if_condition_met() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new("skipping", &[("step1", false), ("step_to_skip", false), ("step3", false)]);

  pipeline.skip_step_if("step_to_skip", |ctx: ContextData<TestContext>| ctx.read().counter > 0);
  pipeline.on("step1", create_simple_handler("step1", " S1"));
  pipeline.on("step_to_skip", create_simple_handler("step_to_skip", " SKIPPED"));
  pipeline.on("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  let guard = ctx.read();
  assert_eq!(guard.message, " S1 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_set_optional_changes_failure_handling() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("toggle", &[("flaky", false), ("after", false)]);
  pipeline.on("flaky", create_failing_handler("flaky", "boom"));
  pipeline.on("after", create_simple_handler("after", "done"));
  pipeline.set_optional("flaky", true);

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().message, "done");
  assert_eq!(pipeline.step_names(), vec!["flaky", "after"]);
  assert_eq!(pipeline.name(), "toggle");
}

#[test]
#[should_panic(expected = "step 'nope' not found")]
fn test_hooking_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new("wiring", &[("real", false)]);
  pipeline.on("nope", create_simple_handler("nope", ""));
}
