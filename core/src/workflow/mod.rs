// core/src/workflow/mod.rs

//! Step-pipeline engine used by the service's multi-step write flows.

pub mod context_data;
pub mod control;
pub mod execution;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use context_data::ContextData;
