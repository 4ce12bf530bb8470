// src/lib.rs

//! Carshare core: business rules and the step-pipeline engine behind the car-sharing service.
//!
//! - `domain`: statuses, roles and permissions, booking periods and overlap, pricing,
//!   payments, payouts and reviews. Pure functions, no I/O.
//! - `workflow`: named-step pipelines with before/on/after async handlers and a
//!   registry keyed by context type. The server runs every multi-step write through it.
//!
//! With the `postgres` feature the status and role enums derive `sqlx::Type`.

pub mod domain;
pub mod error;
pub mod workflow;

pub use crate::domain::{booking, payment, payout, pricing, review};
pub use crate::domain::role::{Permission, Role};
pub use crate::domain::status::{BookingStatus, CarStatus, ChatStatus, PaymentStatus, PaymentType, PayoutStatus};

pub use crate::workflow::context_data::ContextData;
pub use crate::workflow::control::{PipelineControl, PipelineResult};
pub use crate::workflow::pipeline::Pipeline;
pub use crate::workflow::registry::Workflows;
pub use crate::workflow::step::{Handler, StepDef};

pub use crate::error::{DomainError, DomainResult, WorkflowError, WorkflowResult};
