// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::domain::status::{BookingStatus, CarStatus};

/// Failures raised by the workflow engine itself.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Handler missing for required step '{step_name}' in pipeline '{pipeline}'")]
    HandlerMissing { pipeline: String, step_name: String },

    #[error("No pipeline registered for context type {context_type}")]
    PipelineNotRegistered { context_type: String },

    #[error("Type mismatch during context dispatch (expected {expected_type})")]
    TypeMismatch { expected_type: String },

    #[error("Error in step handler. Source: {source}")]
    HandlerError {
        #[source]
        source: AnyhowError,
    },
}

impl From<AnyhowError> for WorkflowError {
    fn from(err: AnyhowError) -> Self {
        WorkflowError::HandlerError { source: err }
    }
}

pub type WorkflowResult<T, E = WorkflowError> = std::result::Result<T, E>;

/// Violations of the car-sharing business rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("End date must be later than start date.")]
    EndBeforeStart,

    #[error("Cannot book a date in the past.")]
    StartInPast,

    #[error("The car is already booked for the requested period.")]
    Overlap,

    #[error("The car is not available for booking (status '{status}').")]
    CarUnavailable { status: CarStatus },

    #[error("You have already reviewed this booking.")]
    AlreadyReviewed,

    #[error("Booking cannot move from '{from}' to '{to}'.")]
    IllegalTransition { from: BookingStatus, to: BookingStatus },

    #[error("{field} must be between 1 and 5, got {value}.")]
    RatingOutOfRange { field: &'static str, value: i32 },

    #[error("Amount must be greater than zero.")]
    NonPositiveAmount,

    #[error("Requested payout {requested} exceeds available balance {available}.")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("Nothing left to pay for this booking.")]
    NothingOutstanding,

    #[error("{0}")]
    Invalid(String),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
