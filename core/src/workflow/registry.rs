// core/src/workflow/registry.rs

//! `Workflows<E>`: pipelines keyed by the type of context they run on.
//!
//! A request handler builds a context value, wraps it in `ContextData` and calls
//! `workflows.run(ctx)`; the registry finds the pipeline registered for that context type.

use crate::error::WorkflowError;
use crate::workflow::context_data::ContextData;
use crate::workflow::control::PipelineResult;
use crate::workflow::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  fn pipeline_name(&self) -> &str;

  /// `ctx_obj` must hold a `ContextData<TData>` for the wrapped pipeline's `TData`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

struct PipelineRunner<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pipeline: Arc<Pipeline<TData, HandlerErr>>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedRunner<AppErr> for PipelineRunner<TData, HandlerErr, AppErr>
where
  TData: 'static + Send + Sync,
  HandlerErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<WorkflowError> + Send + Sync + 'static,
{
  fn pipeline_name(&self) -> &str {
    self.pipeline.name()
  }

  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>();
        event!(Level::ERROR, expected_type, "Context type mismatch in registry dispatch.");
        return Err(AppErr::from(WorkflowError::TypeMismatch {
          expected_type: expected_type.to_string(),
        }));
      }
    };
    self.pipeline.run(ctx_data).await.map_err(AppErr::from)
  }
}

/// Registry of pipelines; `AppErr` is what `run` hands back to callers.
pub struct Workflows<AppErr = WorkflowError>
where
  AppErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  registry: RwLock<HashMap<TypeId, Arc<dyn ErasedRunner<AppErr>>>>,
}

impl<AppErr> Default for Workflows<AppErr>
where
  AppErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Workflows<AppErr>
where
  AppErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its context type, replacing any earlier registration.
  pub fn register<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: 'static + Send + Sync,
    HandlerErr: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    event!(
      Level::DEBUG,
      pipeline = pipeline.name(),
      context_type = %std::any::type_name::<TData>(),
      "Registering pipeline."
    );
    let runner = PipelineRunner::<TData, HandlerErr, AppErr> {
      pipeline: Arc::new(pipeline),
      _app_err: PhantomData,
    };
    self.registry.write().insert(TypeId::of::<TData>(), Arc::new(runner));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Names of all registered pipelines, sorted.
  pub fn pipeline_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self
      .registry
      .read()
      .values()
      .map(|runner| runner.pipeline_name().to_string())
      .collect();
    names.sort();
    names
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = {
      let registry = self.registry.read();
      registry.get(&TypeId::of::<TData>()).cloned()
    };
    let runner = runner.ok_or_else(|| {
      let context_type = std::any::type_name::<TData>();
      event!(Level::ERROR, context_type, "No pipeline registered for context type.");
      AppErr::from(WorkflowError::PipelineNotRegistered {
        context_type: context_type.to_string(),
      })
    })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}
