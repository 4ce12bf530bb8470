// server/src/web/handlers/booking_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::{bookings, payments, reviews};
use crate::errors::AppError;
use crate::pipelines::contexts::{BookingStatusCtxData, PaymentCtxData, ReviewCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use carshare_core::payment::{outstanding, paid_total};
use carshare_core::review::Ratings;
use carshare_core::{BookingStatus, ContextData, PaymentType, Permission, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct ReviewPayload {
  pub rating: i32,
  pub car_rating: Option<i32>,
  pub partner_rating: Option<i32>,
  #[serde(default)]
  pub comment: String,
}

#[derive(Deserialize, Debug)]
pub struct PaymentPayload {
  pub payment_type: PaymentType,
}

#[instrument(name = "handler::my_bookings", skip_all, fields(user_id = %auth.user.id))]
pub async fn my_bookings_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ViewBooking)?;
  let list = bookings::list_for_client(&app_state.db_pool, auth.user.id).await?;
  Ok(HttpResponse::Ok().json(list))
}

/// Visible to the client who booked, the car's partner and staff.
#[instrument(name = "handler::booking_detail", skip(app_state, auth), fields(booking_id = %path.as_ref()))]
pub async fn booking_detail_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ViewBooking)?;
  let summary = bookings::get_summary(&app_state.db_pool, path.into_inner())
    .await?
    .filter(|s| {
      let user = &auth.user;
      user.role.is_staff() || s.booking.client_id == user.id || s.car_partner_id == user.id
    })
    .ok_or_else(|| AppError::NotFound("Booking not found.".to_string()))?;

  let history = payments::list_for_booking(&app_state.db_pool, summary.booking.id).await?;
  let entries: Vec<_> = history.iter().map(|p| p.entry()).collect();
  let paid = paid_total(&entries);
  let review = reviews::get_for_booking(&app_state.db_pool, summary.booking.id).await?;
  let outstanding_cents = if summary.booking.status == BookingStatus::Cancelled {
    0
  } else {
    outstanding(summary.booking.final_price_cents, paid)
  };

  Ok(HttpResponse::Ok().json(json!({
    "booking": summary,
    "payments": history,
    "paid_cents": paid,
    "outstanding_cents": outstanding_cents,
    "review": review,
  })))
}

pub(crate) async fn run_status_change(app_state: &AppState, ctx: ContextData<BookingStatusCtxData>) -> Result<HttpResponse, AppError> {
  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let updated = ctx
        .snapshot()
        .updated
        .ok_or_else(|| AppError::Internal("Status change completed without an updated booking.".to_string()))?;
      Ok(HttpResponse::Ok().json(updated))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(name = "handler::cancel_booking", skip(app_state, auth), fields(booking_id = %path.as_ref()))]
pub async fn cancel_booking_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(BookingStatusCtxData {
    app_state: app_state.get_ref().clone(),
    actor: auth.user,
    booking_id: path.into_inner(),
    target: BookingStatus::Cancelled,
    start_mileage: None,
    end_mileage: None,
    final_price_cents: None,
    booking: None,
    updated: None,
  });
  run_status_change(&app_state, ctx).await
}

#[instrument(name = "handler::review_booking", skip(app_state, auth, payload), fields(booking_id = %path.as_ref()))]
pub async fn review_booking_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<ReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(ReviewCtxData {
    app_state: app_state.get_ref().clone(),
    client: auth.user,
    booking_id: path.into_inner(),
    ratings: Ratings {
      rating: payload.rating,
      car_rating: payload.car_rating,
      partner_rating: payload.partner_rating,
    },
    comment: payload.comment,
    booking: None,
    review: None,
  });

  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let review = ctx
        .snapshot()
        .review
        .ok_or_else(|| AppError::Internal("Review pipeline completed without a review.".to_string()))?;
      Ok(HttpResponse::Created().json(review))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(
  name = "handler::pay_booking",
  skip(app_state, auth, payload),
  fields(booking_id = %path.as_ref(), payment_type = %payload.payment_type)
)]
pub async fn pay_booking_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<PaymentPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::AddPayment)?;
  let ctx = ContextData::new(PaymentCtxData {
    app_state: app_state.get_ref().clone(),
    client: auth.user,
    booking_id: path.into_inner(),
    payment_type: payload.payment_type,
    booking: None,
    amount_cents: None,
    intent: None,
    payment: None,
  });

  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let payment = ctx
        .snapshot()
        .payment
        .ok_or_else(|| AppError::Internal("Payment pipeline completed without a payment.".to_string()))?;
      info!(payment_id = %payment.id, "Booking paid.");
      Ok(HttpResponse::Created().json(payment))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}
