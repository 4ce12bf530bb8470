// server/src/pipelines/payment_pipeline.rs

use crate::db::{bookings, payments};
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::PaymentCtxData;
use crate::services::payment_mock::{self, IntentStatus};
use carshare_core::payment::{amount_due, paid_total};
use carshare_core::{ContextData, PaymentStatus, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

pub fn register_payment_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<PaymentCtxData, AppError>::new(
    "payment",
    &[
      ("check_payment_type", false),
      ("load_booking", false),
      ("compute_amount_due", false),
      ("charge_gateway", false),
      ("record_payment", false),
    ],
  );

  p.on("check_payment_type", |ctx| Box::pin(check_payment_type(ctx)));
  p.on("load_booking", |ctx| Box::pin(load_booking(ctx)));
  p.on("compute_amount_due", |ctx| Box::pin(compute_amount_due(ctx)));
  p.on("charge_gateway", |ctx| Box::pin(charge_gateway(ctx)));
  p.on("record_payment", |ctx| Box::pin(record_payment(ctx)));

  workflows.register(p);
  info!("Payment pipeline registered.");
}

async fn check_payment_type(ctx: ContextData<PaymentCtxData>) -> AppResult<PipelineControl> {
  let payment_type = ctx.read().payment_type;
  if !payment_type.is_client_initiated() {
    return Err(AppError::Validation(format!(
      "Payment type '{}' cannot be paid by a client.",
      payment_type
    )));
  }
  Ok(PipelineControl::Continue)
}

/// Only the client who made the booking pays for it.
async fn load_booking(ctx: ContextData<PaymentCtxData>) -> AppResult<PipelineControl> {
  let (booking_id, client_id, pool) = {
    let guard = ctx.read();
    (guard.booking_id, guard.client.id, guard.app_state.db_pool.clone())
  };
  let booking = bookings::get_booking(&pool, booking_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found.".to_string()))?;
  if booking.client_id != client_id {
    return Err(AppError::NotFound("Booking not found.".to_string()));
  }
  ctx.write().booking = Some(booking);
  Ok(PipelineControl::Continue)
}

async fn compute_amount_due(ctx: ContextData<PaymentCtxData>) -> AppResult<PipelineControl> {
  let (booking, payment_type, pool, prepayment_percent) = {
    let guard = ctx.read();
    (
      guard.booking.clone(),
      guard.payment_type,
      guard.app_state.db_pool.clone(),
      guard.app_state.config.prepayment_percent,
    )
  };
  let booking = booking.ok_or_else(|| AppError::Internal("Amount computed before booking load.".to_string()))?;
  let history = payments::list_for_booking(&pool, booking.id).await?;
  let entries: Vec<_> = history.iter().map(|p| p.entry()).collect();
  let paid = paid_total(&entries);
  let amount = amount_due(payment_type, booking.status, booking.final_price_cents, paid, prepayment_percent)?;
  event!(Level::DEBUG, booking_id = %booking.id, paid_cents = paid, amount_cents = amount, "Amount due computed.");
  ctx.write().amount_cents = Some(amount);
  Ok(PipelineControl::Continue)
}

/// A declined charge is recorded as a failed payment before the error is returned.
async fn charge_gateway(ctx: ContextData<PaymentCtxData>) -> AppResult<PipelineControl> {
  let (booking_id, amount, payment_type, account_id, pool) = {
    let guard = ctx.read();
    (
      guard.booking_id,
      guard.amount_cents,
      guard.payment_type,
      guard.app_state.config.mock_payment_account_id.clone(),
      guard.app_state.db_pool.clone(),
    )
  };
  let amount = amount.ok_or_else(|| AppError::Internal("Charge attempted without an amount.".to_string()))?;
  let mut intent = payment_mock::create_mock_payment_intent(booking_id, amount, &account_id).await?;
  if let Err(decline) = payment_mock::confirm_mock_payment(&mut intent).await {
    warn!(booking_id = %booking_id, intent_id = %intent.id, "Charge declined.");
    payments::insert_payment(&pool, booking_id, amount, payment_type, PaymentStatus::Failed, Some(&intent.id)).await?;
    return Err(decline);
  }
  ctx.write().intent = Some(intent);
  Ok(PipelineControl::Continue)
}

async fn record_payment(ctx: ContextData<PaymentCtxData>) -> AppResult<PipelineControl> {
  let (booking_id, payment_type, intent, pool) = {
    let guard = ctx.read();
    (guard.booking_id, guard.payment_type, guard.intent.clone(), guard.app_state.db_pool.clone())
  };
  let intent = intent
    .filter(|i| i.status == IntentStatus::Succeeded)
    .ok_or_else(|| AppError::Internal("Payment recorded without a succeeded charge.".to_string()))?;
  let payment = payments::insert_payment(
    &pool,
    booking_id,
    intent.amount_cents,
    payment_type,
    PaymentStatus::Succeeded,
    Some(&intent.id),
  )
  .await?;
  info!(payment_id = %payment.id, booking_id = %booking_id, amount_cents = payment.amount_cents, "Payment recorded.");
  ctx.write().payment = Some(payment);
  Ok(PipelineControl::Continue)
}
