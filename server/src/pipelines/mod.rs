// server/src/pipelines/mod.rs

//! Multi-step write flows, each registered as a pipeline keyed by its context type.

use crate::errors::AppError;
use carshare_core::Workflows;

pub mod contexts;

pub mod booking_pipeline;
pub mod booking_status_pipeline;
pub mod expired_bookings_pipeline;
pub mod payment_pipeline;
pub mod payout_pipeline;
pub mod review_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline. Called once at startup, and by the admin CLI.
pub fn register_all_pipelines(workflows: &Workflows<AppError>) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(workflows);
  signin_pipeline::register_signin_pipeline(workflows);
  booking_pipeline::register_booking_pipeline(workflows);
  booking_status_pipeline::register_booking_status_pipeline(workflows);
  payment_pipeline::register_payment_pipeline(workflows);
  review_pipeline::register_review_pipeline(workflows);
  payout_pipeline::register_payout_pipeline(workflows);
  expired_bookings_pipeline::register_expired_bookings_pipeline(workflows);

  tracing::info!(pipelines = ?workflows.pipeline_names(), "All pipelines registered.");
}
