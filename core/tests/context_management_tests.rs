// tests/context_management_tests.rs
mod common;

use common::*;
use carshare_core::{ContextData, Pipeline, PipelineControl};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_and_modified() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new("shared", &[("step1_modify", false), ("step2_read_modify", false)]);

  pipeline.on("step1_modify", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    guard.counter = 10;
    guard.message = "SetByStep1".to_string();
    Ok::<_, TestError>(PipelineControl::Continue)
  });

  pipeline.on("step2_read_modify", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    assert_eq!(guard.counter, 10);
    guard.counter += 5;
    guard.message.push_str("_ThenStep2");
    Ok::<_, TestError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.counter, 15);
  assert_eq!(guard.message, "SetByStep1_ThenStep2");
}

#[tokio::test]
#[serial]
async fn test_context_data_clone_shares_data() {
  setup_tracing();
  let original = ContextData::new(TestContext {
    counter: 1,
    ..Default::default()
  });
  let cloned = original.clone();

  original.write().counter = 5;
  assert_eq!(cloned.read().counter, 5);

  cloned.write().counter = 10;
  assert_eq!(original.read().counter, 10);
  assert_eq!(*original.map_read(|c| &c.counter), 10);
}

#[tokio::test]
#[serial]
async fn test_guards_released_before_await() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("awaiting", &[("io", false)]);

  pipeline.on("io", |ctx: ContextData<TestContext>| async move {
    let before = { ctx.read().counter };
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    {
      let mut guard = ctx.write();
      guard.counter = before + 1;
      guard.steps_executed.push("io".to_string());
    }
    Ok::<_, TestError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert!(ctx.try_read().is_some());
  assert_eq!(ctx.snapshot().counter, 1);
}
