// server/src/pipelines/booking_pipeline.rs

//! Booking a car: validate the requested period, check the car and its calendar, price it,
//! then insert the booking and mark the car booked in one transaction.

use crate::db::{bookings, cars};
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::BookingCtxData;
use crate::services::notification_mock;
use carshare_core::booking::{parse_datetime, BookingPeriod};
use carshare_core::pricing::{format_amount, rental_price};
use carshare_core::{BookingStatus, ContextData, DomainError, Permission, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

pub fn register_booking_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<BookingCtxData, AppError>::new(
    "booking",
    &[
      ("authorize_client", false),
      ("validate_booking_dates", false),
      ("load_car", false),
      ("check_overlap", false),
      ("calculate_price", false),
      ("persist_booking", false),
      ("notify_client", true),
    ],
  );

  p.on("authorize_client", |ctx| Box::pin(authorize_client(ctx)));
  p.on("validate_booking_dates", |ctx| Box::pin(validate_booking_dates(ctx)));
  p.on("load_car", |ctx| Box::pin(load_car(ctx)));
  p.on("check_overlap", |ctx| Box::pin(check_overlap(ctx)));
  p.on("calculate_price", |ctx| Box::pin(calculate_price(ctx)));
  p.on("persist_booking", |ctx| Box::pin(persist_booking(ctx)));
  p.on("notify_client", |ctx| Box::pin(notify_client(ctx)));

  workflows.register(p);
  info!("Booking pipeline registered.");
}

async fn authorize_client(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let role = ctx.read().client.role;
  if !role.can(Permission::AddBooking) {
    warn!(role = %role, "Booking attempt without add_booking permission.");
    return Err(AppError::Forbidden("Only clients can book cars.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn validate_booking_dates(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (start_raw, end_raw, now) = {
    let guard = ctx.read();
    (guard.start_raw.clone(), guard.end_raw.clone(), guard.now)
  };
  let start = parse_datetime(&start_raw)
    .ok_or_else(|| AppError::Validation(format!("Invalid start date '{}'.", start_raw)))?;
  let end =
    parse_datetime(&end_raw).ok_or_else(|| AppError::Validation(format!("Invalid end date '{}'.", end_raw)))?;
  let period = BookingPeriod::for_new_booking(start, end, now)?;
  event!(Level::DEBUG, start = %period.start(), end = %period.end(), "Booking period accepted.");
  ctx.write().period = Some(period);
  Ok(PipelineControl::Continue)
}

async fn load_car(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (car_id, pool) = {
    let guard = ctx.read();
    (guard.car_id, guard.app_state.db_pool.clone())
  };
  let car = cars::get_car(&pool, car_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
  car.status.ensure_bookable()?;
  ctx.write().car = Some(car);
  Ok(PipelineControl::Continue)
}

async fn check_overlap(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (car_id, period, pool) = {
    let guard = ctx.read();
    (guard.car_id, guard.period, guard.app_state.db_pool.clone())
  };
  let period = period.ok_or_else(|| AppError::Internal("Overlap check before date validation.".to_string()))?;
  if bookings::has_overlap(&pool, car_id, period.start(), period.end()).await? {
    warn!(car_id = %car_id, "Requested period overlaps an existing booking.");
    return Err(DomainError::Overlap.into());
  }
  Ok(PipelineControl::Continue)
}

async fn calculate_price(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx.write();
  let (rates, period) = match (guard.car.as_ref(), guard.period.as_ref()) {
    (Some(car), Some(period)) => (car.rates(), *period),
    _ => return Err(AppError::Internal("Pricing needs a loaded car and a period.".to_string())),
  };
  let price = rental_price(rates, &period);
  event!(Level::DEBUG, price_cents = price, hours = period.hours(), "Booking priced.");
  guard.price_cents = Some(price);
  Ok(PipelineControl::Continue)
}

async fn persist_booking(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (client_id, car_id, period, price, pool) = {
    let guard = ctx.read();
    (
      guard.client.id,
      guard.car_id,
      guard.period,
      guard.price_cents,
      guard.app_state.db_pool.clone(),
    )
  };
  let (period, price) = period
    .zip(price)
    .ok_or_else(|| AppError::Internal("Booking persisted before pricing.".to_string()))?;

  let mut tx = pool.begin().await?;
  // Narrows the race window only. Two concurrent inserts under READ COMMITTED can both pass.
  if bookings::has_overlap(&mut *tx, car_id, period.start(), period.end()).await? {
    return Err(DomainError::Overlap.into());
  }
  let booking = bookings::insert_booking(&mut *tx, client_id, car_id, period.start(), period.end(), price).await?;
  cars::set_status(&mut *tx, car_id, BookingStatus::Confirmed.car_status_after()).await?;
  tx.commit().await?;

  info!(booking_id = %booking.id, car_id = %car_id, price_cents = price, "Booking created.");
  ctx.write().booking = Some(booking);
  Ok(PipelineControl::Continue)
}

async fn notify_client(ctx: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (email, message) = {
    let guard = ctx.read();
    let (Some(booking), Some(car)) = (guard.booking.as_ref(), guard.car.as_ref()) else {
      return Ok(PipelineControl::Continue);
    };
    (
      guard.client.email.clone(),
      format!(
        "{} is booked from {} to {}. Total: {}.",
        car.title(),
        booking.start_date.format("%Y-%m-%d %H:%M"),
        booking.end_date.format("%Y-%m-%d %H:%M"),
        format_amount(booking.final_price_cents)
      ),
    )
  };
  notification_mock::send_mock_notification(&email, "Booking confirmed", &message).await?;
  ctx.write().notification_sent = true;
  Ok(PipelineControl::Continue)
}
