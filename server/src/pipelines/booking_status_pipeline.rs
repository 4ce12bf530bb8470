// server/src/pipelines/booking_status_pipeline.rs

//! Moves a booking along `confirmed -> active -> completed` or `confirmed -> cancelled`
//! and keeps the car's status in step.

use crate::db::bookings::{self, StatusChange};
use crate::db::cars;
use crate::errors::AppError;
use crate::pipelines::contexts::BookingStatusCtxData;
use carshare_core::{BookingStatus, ContextData, Permission, Pipeline, PipelineControl, Workflows};
use tracing::{info, warn};

pub fn register_booking_status_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<BookingStatusCtxData, AppError>::new(
    "booking_status",
    &[
      ("validate_status_fields", false),
      ("load_booking", false),
      ("authorize_actor", false),
      ("check_transition", false),
      ("apply_transition", false),
    ],
  );

  p.on("validate_status_fields", |ctx: ContextData<BookingStatusCtxData>| {
    Box::pin(async move {
      let guard = ctx.read();
      if guard.start_mileage.is_some_and(|m| m < 0) || guard.end_mileage.is_some_and(|m| m < 0) {
        return Err(AppError::Validation("Mileage cannot be negative.".to_string()));
      }
      if guard.final_price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::Validation("Final price cannot be negative.".to_string()));
      }
      let carries_completion_fields = guard.end_mileage.is_some() || guard.final_price_cents.is_some();
      if carries_completion_fields && guard.target != BookingStatus::Completed {
        return Err(AppError::Validation(
          "End mileage and final price can only be set when completing a booking.".to_string(),
        ));
      }
      if guard.start_mileage.is_some() && guard.target != BookingStatus::Active {
        return Err(AppError::Validation(
          "Start mileage can only be set when activating a booking.".to_string(),
        ));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on("load_booking", |ctx: ContextData<BookingStatusCtxData>| {
    Box::pin(async move {
      let (booking_id, pool) = {
        let guard = ctx.read();
        (guard.booking_id, guard.app_state.db_pool.clone())
      };
      let booking = bookings::get_booking(&pool, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".to_string()))?;
      ctx.write().booking = Some(booking);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("authorize_actor", |ctx: ContextData<BookingStatusCtxData>| {
    Box::pin(async move {
      let guard = ctx.read();
      let owner = guard.booking.as_ref().map(|b| b.client_id);
      let actor = &guard.actor;
      let allowed = actor.role.can(Permission::ChangeBooking)
        || (guard.target == BookingStatus::Cancelled && owner == Some(actor.id));
      if allowed {
        Ok(PipelineControl::Continue)
      } else {
        warn!(actor_id = %actor.id, target = %guard.target, "Booking status change refused.");
        Err(AppError::Forbidden(
          "You are not allowed to change the status of this booking.".to_string(),
        ))
      }
    })
  });

  p.on("check_transition", |ctx: ContextData<BookingStatusCtxData>| {
    Box::pin(async move {
      let guard = ctx.read();
      let current = guard
        .booking
        .as_ref()
        .map(|b| b.status)
        .ok_or_else(|| AppError::Internal("Transition check before booking load.".to_string()))?;
      current.transition_to(guard.target)?;
      if let (Some(start), Some(end)) = (
        guard.booking.as_ref().and_then(|b| b.start_mileage),
        guard.end_mileage,
      ) {
        if end < start {
          return Err(AppError::Validation(
            "End mileage cannot be lower than start mileage.".to_string(),
          ));
        }
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("apply_transition", |ctx: ContextData<BookingStatusCtxData>| {
    Box::pin(async move {
      let (booking, target, change, pool) = {
        let guard = ctx.read();
        (
          guard.booking.clone(),
          guard.target,
          StatusChange {
            start_mileage: guard.start_mileage,
            end_mileage: guard.end_mileage,
            final_price_cents: guard.final_price_cents,
          },
          guard.app_state.db_pool.clone(),
        )
      };
      let booking = booking.ok_or_else(|| AppError::Internal("Transition applied before booking load.".to_string()))?;

      let mut tx = pool.begin().await?;
      let updated = bookings::update_status(&mut *tx, booking.id, target, change).await?;
      cars::set_status(&mut *tx, booking.car_id, target.car_status_after()).await?;
      tx.commit().await?;

      info!(
        booking_id = %booking.id,
        from = %booking.status,
        to = %target,
        final_price_cents = updated.final_price_cents,
        "Booking status changed."
      );
      ctx.write().updated = Some(updated);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register(p);
  info!("Booking status pipeline registered.");
}
