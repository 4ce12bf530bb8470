// server/src/web/handlers/partner_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::db::{bookings, cars};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use carshare_core::Role;

#[instrument(name = "handler::partner_cars", skip_all, fields(user_id = %auth.user.id))]
pub async fn partner_cars_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require_role(&[Role::Partner])?;
  let list = cars::list_by_partner(&app_state.db_pool, auth.user.id).await?;
  Ok(HttpResponse::Ok().json(list))
}

#[instrument(name = "handler::partner_bookings", skip_all, fields(user_id = %auth.user.id))]
pub async fn partner_bookings_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require_role(&[Role::Partner])?;
  let list = bookings::list_for_partner(&app_state.db_pool, auth.user.id).await?;
  Ok(HttpResponse::Ok().json(list))
}
