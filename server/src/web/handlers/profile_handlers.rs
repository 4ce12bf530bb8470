// server/src/web/handlers/profile_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::db::users::{self, ProfileUpdate};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ProfilePayload {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub phone: Option<String>,
  pub driver_license: Option<String>,
}

pub async fn get_profile_handler(auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(auth.user))
}

#[instrument(name = "handler::update_profile", skip_all, fields(user_id = %auth.user.id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  payload: web::Json<ProfilePayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());
  let update = ProfileUpdate {
    first_name: trimmed(payload.first_name),
    last_name: trimmed(payload.last_name),
    phone: trimmed(payload.phone),
    driver_license: trimmed(payload.driver_license),
  };
  if update.phone.as_deref().is_some_and(|p| p.chars().count() > 20) {
    return Err(AppError::Validation("Phone number must be at most 20 characters.".to_string()));
  }
  let user = users::update_profile(&app_state.db_pool, auth.user.id, &update)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  Ok(HttpResponse::Ok().json(user))
}
