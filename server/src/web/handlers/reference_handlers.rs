// server/src/web/handlers/reference_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::reference;
use crate::errors::AppError;
use crate::state::AppState;
use carshare_core::{BookingStatus, CarStatus, ChatStatus, PaymentStatus, PaymentType, PayoutStatus, Role};

pub async fn reference_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let transmissions = reference::list_transmissions(&app_state.db_pool).await?;
  let categories = reference::list_categories(&app_state.db_pool).await?;
  let roles: Vec<_> = Role::ALL
    .iter()
    .map(|r| json!({ "value": r.as_str(), "label": r.display_name() }))
    .collect();
  Ok(HttpResponse::Ok().json(json!({
    "transmissions": transmissions,
    "categories": categories,
    "car_statuses": CarStatus::ALL,
    "booking_statuses": BookingStatus::ALL,
    "payment_types": PaymentType::ALL,
    "payment_statuses": PaymentStatus::ALL,
    "chat_statuses": ChatStatus::ALL,
    "payout_statuses": PayoutStatus::ALL,
    "roles": roles,
  })))
}
