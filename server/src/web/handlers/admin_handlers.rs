// server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::{bookings, cars, dashboard, payments, users};
use crate::errors::AppError;
use crate::models::Payment;
use crate::pipelines::contexts::BookingStatusCtxData;
use crate::pipelines::expired_bookings_pipeline;
use crate::services::payment_mock;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::booking_handlers::run_status_change;
use carshare_core::payment::{ensure_refundable, validate_fine};
use carshare_core::{BookingStatus, ContextData, PaymentStatus, PaymentType, Permission, Role};

#[derive(Deserialize, Debug)]
pub struct BookingFilter {
  pub status: Option<BookingStatus>,
}

#[derive(Deserialize, Debug)]
pub struct UserFilter {
  pub role: Option<Role>,
}

#[derive(Deserialize, Debug)]
pub struct RolePayload {
  pub role: Role,
}

#[derive(Deserialize, Debug)]
pub struct BookingStatusPayload {
  pub status: BookingStatus,
  pub start_mileage: Option<i32>,
  pub end_mileage: Option<i32>,
  pub final_price_cents: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct FinePayload {
  pub amount_cents: i64,
}

#[instrument(name = "handler::dashboard", skip_all, fields(user_id = %auth.user.id))]
pub async fn dashboard_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  auth.require_role(&[Role::Admin])?;
  let stats = dashboard::fetch_stats(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(stats))
}

#[instrument(name = "handler::admin_cars", skip_all)]
pub async fn admin_cars_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  auth.require_role(&[Role::Admin])?;
  let list = cars::list_all(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(list))
}

#[instrument(name = "handler::admin_bookings", skip(app_state, auth))]
pub async fn admin_bookings_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<BookingFilter>,
) -> Result<HttpResponse, AppError> {
  auth.require_staff()?;
  auth.require(Permission::ViewBooking)?;
  let list = bookings::list_all(&app_state.db_pool, query.status).await?;
  Ok(HttpResponse::Ok().json(list))
}

#[instrument(name = "handler::admin_users", skip(app_state, auth))]
pub async fn admin_users_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<UserFilter>,
) -> Result<HttpResponse, AppError> {
  auth.require_role(&[Role::Admin])?;
  let list = users::list_users(&app_state.db_pool, query.role).await?;
  Ok(HttpResponse::Ok().json(list))
}

#[instrument(name = "handler::set_user_role", skip(app_state, auth, payload), fields(target_user = %path.as_ref()))]
pub async fn set_user_role_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<RolePayload>,
) -> Result<HttpResponse, AppError> {
  auth.require_role(&[Role::Admin])?;
  let target = path.into_inner();
  if target == auth.user.id && payload.role != Role::Admin {
    return Err(AppError::Validation("Administrators cannot demote themselves.".to_string()));
  }
  let user = users::set_role(&app_state.db_pool, target, payload.role)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  info!(user_id = %user.id, role = %user.role, "User role changed.");
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::admin_booking_status", skip(app_state, auth, payload), fields(booking_id = %path.as_ref()))]
pub async fn booking_status_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<BookingStatusPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require_staff()?;
  let payload = payload.into_inner();
  let ctx = ContextData::new(BookingStatusCtxData {
    app_state: app_state.get_ref().clone(),
    actor: auth.user,
    booking_id: path.into_inner(),
    target: payload.status,
    start_mileage: payload.start_mileage,
    end_mileage: payload.end_mileage,
    final_price_cents: payload.final_price_cents,
    booking: None,
    updated: None,
  });
  run_status_change(&app_state, ctx).await
}

/// Marks the payment refunded and records a matching `refund` payment.
#[instrument(name = "handler::refund_payment", skip(app_state, auth), fields(payment_id = %path.as_ref()))]
pub async fn refund_payment_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require_staff()?;
  auth.require(Permission::ChangePayment)?;
  let refund = refund_payment(app_state.get_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Created().json(refund))
}

/// The status flip and the refund row commit together. A second refund of the same payment
/// finds the row no longer `succeeded` and gets a conflict before the provider is called.
pub async fn refund_payment(app_state: &AppState, payment_id: Uuid) -> Result<Payment, AppError> {
  let original = payments::get_payment(&app_state.db_pool, payment_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Payment not found.".to_string()))?;
  ensure_refundable(&original.entry())?;

  let mut tx = app_state.db_pool.begin().await?;
  if !payments::mark_refunded(&mut *tx, original.id).await? {
    warn!(payment_id = %original.id, "Payment was refunded concurrently.");
    return Err(AppError::Conflict("Payment has already been refunded.".to_string()));
  }
  let original_txn = original.transaction_id.clone().unwrap_or_default();
  let refund_txn = payment_mock::refund_mock_payment(&original_txn, original.amount_cents).await?;
  let refund = payments::insert_payment(
    &mut *tx,
    original.booking_id,
    original.amount_cents,
    PaymentType::Refund,
    PaymentStatus::Succeeded,
    Some(&refund_txn),
  )
  .await?;
  tx.commit().await?;

  info!(payment_id = %original.id, refund_id = %refund.id, amount_cents = refund.amount_cents, "Payment refunded.");
  Ok(refund)
}

/// Fines are recorded as pending charges against the booking.
#[instrument(name = "handler::fine_booking", skip(app_state, auth, payload), fields(booking_id = %path.as_ref()))]
pub async fn fine_booking_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<FinePayload>,
) -> Result<HttpResponse, AppError> {
  auth.require_staff()?;
  auth.require(Permission::ChangePayment)?;
  let amount = validate_fine(payload.amount_cents)?;
  let booking = bookings::get_booking(&app_state.db_pool, path.into_inner())
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found.".to_string()))?;
  let fine = payments::insert_payment(
    &app_state.db_pool,
    booking.id,
    amount,
    PaymentType::Fine,
    PaymentStatus::Pending,
    None,
  )
  .await?;
  warn!(booking_id = %booking.id, amount_cents = amount, "Fine recorded.");
  Ok(HttpResponse::Created().json(fine))
}

#[instrument(name = "handler::complete_expired", skip_all)]
pub async fn complete_expired_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require_staff()?;
  let report = expired_bookings_pipeline::run_sweep(app_state.get_ref()).await?;
  Ok(HttpResponse::Ok().json(report))
}
