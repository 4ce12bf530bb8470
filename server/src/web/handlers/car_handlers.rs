// server/src/web/handlers/car_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::cars::{self, CarInput, CarSort};
use crate::db::{reference, reviews};
use crate::errors::{AppError, Result as AppResult};
use crate::models::Car;
use crate::pipelines::contexts::BookingCtxData;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use carshare_core::booking::parse_datetime;
use carshare_core::review::{RatingSummary, Ratings};
use carshare_core::{CarStatus, ContextData, Permission, PipelineResult, Role};

pub const HOME_CAR_LIMIT: i64 = 6;
pub const MIN_CAR_YEAR: i32 = 1950;

#[derive(Deserialize, Debug)]
pub struct HomeQuery {
  pub search: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CarListQuery {
  pub category: Option<i32>,
  pub sort: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AvailabilityQuery {
  pub start_date: Option<String>,
  pub end_date: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct BookPayload {
  pub start_date: String,
  pub end_date: String,
}

#[derive(Deserialize, Debug)]
pub struct CarStatusPayload {
  pub status: CarStatus,
}

#[derive(Deserialize, Debug)]
pub struct ImagePayload {
  pub url: String,
  #[serde(default)]
  pub is_primary: bool,
}

pub fn validate_car_input(input: &CarInput) -> AppResult<()> {
  if input.brand.trim().is_empty() || input.model.trim().is_empty() {
    return Err(AppError::Validation("Brand and model are required.".to_string()));
  }
  if input.engine_type.trim().is_empty() {
    return Err(AppError::Validation("Engine type is required.".to_string()));
  }
  let max_year = Utc::now().year() + 1;
  if input.year < MIN_CAR_YEAR || input.year > max_year {
    return Err(AppError::Validation(format!(
      "Year must be between {} and {}.",
      MIN_CAR_YEAR, max_year
    )));
  }
  if input.price_per_hour_cents <= 0 || input.price_per_day_cents <= 0 {
    return Err(AppError::Validation("Prices must be positive.".to_string()));
  }
  if input.mileage_limit.is_some_and(|m| m <= 0) {
    return Err(AppError::Validation("Mileage limit must be positive.".to_string()));
  }
  if input.latitude.is_some_and(|v| !(-90.0..=90.0).contains(&v))
    || input.longitude.is_some_and(|v| !(-180.0..=180.0).contains(&v))
  {
    return Err(AppError::Validation("Coordinates are out of range.".to_string()));
  }
  Ok(())
}

async fn validate_references(app_state: &AppState, input: &CarInput) -> AppResult<()> {
  let transmissions = reference::list_transmissions(&app_state.db_pool).await?;
  if !transmissions.iter().any(|t| t.id == input.transmission_id) {
    return Err(AppError::Validation("Unknown transmission type.".to_string()));
  }
  if let Some(category_id) = input.category_id {
    let categories = reference::list_categories(&app_state.db_pool).await?;
    if !categories.iter().any(|c| c.id == category_id) {
      return Err(AppError::Validation("Unknown car category.".to_string()));
    }
  }
  Ok(())
}

/// Loads a car the caller may manage: admins any car, partners their own.
async fn load_managed_car(app_state: &AppState, auth: &AuthenticatedUser, car_id: Uuid, permission: Permission) -> AppResult<Car> {
  auth.require(permission)?;
  let car = cars::get_car(&app_state.db_pool, car_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
  let role = auth.user.role;
  if role == Role::Admin || (role == Role::Partner && car.partner_id == auth.user.id) {
    Ok(car)
  } else {
    warn!(car_id = %car_id, user_id = %auth.user.id, "Car management refused for non-owner.");
    Err(AppError::Forbidden("You can only manage your own cars.".to_string()))
  }
}

#[instrument(name = "handler::home", skip(app_state))]
pub async fn home_handler(app_state: web::Data<AppState>, query: web::Query<HomeQuery>) -> Result<HttpResponse, AppError> {
  let cars = cars::home_cars(&app_state.db_pool, query.search.as_deref(), HOME_CAR_LIMIT).await?;
  let categories = reference::list_categories(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "cars": cars, "categories": categories })))
}

#[instrument(name = "handler::list_cars", skip(app_state))]
pub async fn list_cars_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CarListQuery>,
) -> Result<HttpResponse, AppError> {
  let sort = CarSort::parse(query.sort.as_deref());
  let cars = cars::list_available(&app_state.db_pool, query.category, sort).await?;
  let categories = reference::list_categories(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({
    "cars": cars,
    "categories": categories,
    "selected_category": query.category,
  })))
}

/// Car detail. Availability is only checked when both dates parse; otherwise it reads as available.
#[instrument(name = "handler::car_detail", skip(app_state, query), fields(car_id = %path.as_ref()))]
pub async fn car_detail_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, AppError> {
  let car_id = path.into_inner();
  let listing = cars::get_listing(&app_state.db_pool, car_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
  let images = cars::list_images(&app_state.db_pool, car_id).await?;
  let car_reviews = reviews::list_for_car(&app_state.db_pool, car_id).await?;
  let ratings: Vec<Ratings> = car_reviews.iter().map(|r| r.review.ratings()).collect();

  let requested = query
    .start_date
    .as_deref()
    .and_then(parse_datetime)
    .zip(query.end_date.as_deref().and_then(parse_datetime));
  let available = match requested {
    Some((start, end)) => cars::is_available_for(&app_state.db_pool, car_id, start, end).await?,
    None => true,
  };

  Ok(HttpResponse::Ok().json(json!({
    "car": listing,
    "images": images,
    "reviews": car_reviews,
    "rating_summary": RatingSummary::from_ratings(&ratings),
    "available": available,
  })))
}

#[instrument(name = "handler::car_reviews", skip(app_state), fields(car_id = %path.as_ref()))]
pub async fn car_reviews_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let car_id = path.into_inner();
  cars::get_car(&app_state.db_pool, car_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
  let car_reviews = reviews::list_for_car(&app_state.db_pool, car_id).await?;
  let ratings: Vec<Ratings> = car_reviews.iter().map(|r| r.review.ratings()).collect();
  Ok(HttpResponse::Ok().json(json!({
    "reviews": car_reviews,
    "summary": RatingSummary::from_ratings(&ratings),
  })))
}

#[instrument(
  name = "handler::book_car",
  skip(app_state, auth, payload),
  fields(user_id = %auth.user.id, car_id = %path.as_ref())
)]
pub async fn book_car_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<BookPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(BookingCtxData::new(
    app_state.get_ref().clone(),
    auth.user,
    path.into_inner(),
    payload.start_date,
    payload.end_date,
  ));

  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let data = ctx.snapshot();
      let booking = data
        .booking
        .ok_or_else(|| AppError::Internal("Booking pipeline completed without a booking.".to_string()))?;
      info!(booking_id = %booking.id, "Car booked.");
      Ok(HttpResponse::Created().json(json!({
        "booking": booking,
        "notification_sent": data.notification_sent,
      })))
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

#[instrument(name = "handler::create_car", skip_all, fields(user_id = %auth.user.id))]
pub async fn create_car_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  payload: web::Json<CarInput>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::AddCar)?;
  auth.require_role(&[Role::Partner, Role::Admin])?;
  validate_car_input(&payload)?;
  validate_references(&app_state, &payload).await?;
  let car = cars::insert_car(&app_state.db_pool, auth.user.id, &payload).await?;
  info!(car_id = %car.id, "Car listed.");
  Ok(HttpResponse::Created().json(car))
}

#[instrument(name = "handler::update_car", skip(app_state, auth, payload), fields(car_id = %path.as_ref()))]
pub async fn update_car_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<CarInput>,
) -> Result<HttpResponse, AppError> {
  let car = load_managed_car(&app_state, &auth, path.into_inner(), Permission::ChangeCar).await?;
  validate_car_input(&payload)?;
  validate_references(&app_state, &payload).await?;
  let updated = cars::update_car(&app_state.db_pool, car.id, &payload)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_car", skip(app_state, auth), fields(car_id = %path.as_ref()))]
pub async fn delete_car_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let car = load_managed_car(&app_state, &auth, path.into_inner(), Permission::DeleteCar).await?;
  cars::delete_car(&app_state.db_pool, car.id).await?;
  info!(car_id = %car.id, "Car deleted.");
  Ok(HttpResponse::NoContent().finish())
}

/// Managers may set the status of any car.
#[instrument(name = "handler::set_car_status", skip(app_state, auth, payload), fields(car_id = %path.as_ref()))]
pub async fn set_car_status_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<CarStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let car_id = path.into_inner();
  let car = if auth.user.role.is_manager() {
    cars::get_car(&app_state.db_pool, car_id)
      .await?
      .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?
  } else {
    load_managed_car(&app_state, &auth, car_id, Permission::ChangeCar).await?
  };
  cars::set_status(&app_state.db_pool, car.id, payload.status).await?;
  info!(car_id = %car.id, from = %car.status, to = %payload.status, "Car status changed.");
  let listing = cars::get_listing(&app_state.db_pool, car.id)
    .await?
    .ok_or_else(|| AppError::NotFound("Car not found.".to_string()))?;
  Ok(HttpResponse::Ok().json(listing))
}

#[instrument(name = "handler::add_car_image", skip(app_state, auth, payload), fields(car_id = %path.as_ref()))]
pub async fn add_image_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<ImagePayload>,
) -> Result<HttpResponse, AppError> {
  let car = load_managed_car(&app_state, &auth, path.into_inner(), Permission::ChangeCar).await?;
  let url = payload.url.trim();
  if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/')) {
    return Err(AppError::Validation("Image URL must be absolute or site-relative.".to_string()));
  }
  let image = cars::add_image(&app_state.db_pool, car.id, url, payload.is_primary).await?;
  Ok(HttpResponse::Created().json(image))
}

#[instrument(name = "handler::delete_car_image", skip(app_state, auth))]
pub async fn delete_image_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
  let (car_id, image_id) = path.into_inner();
  let car = load_managed_car(&app_state, &auth, car_id, Permission::ChangeCar).await?;
  if !cars::delete_image(&app_state.db_pool, car.id, image_id).await? {
    return Err(AppError::NotFound("Image not found.".to_string()));
  }
  Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input() -> CarInput {
    CarInput {
      brand: "Kia".to_string(),
      model: "Rio".to_string(),
      year: 2021,
      transmission_id: 1,
      engine_type: "petrol".to_string(),
      description: String::new(),
      price_per_hour_cents: 45_000,
      price_per_day_cents: 290_000,
      mileage_limit: Some(300),
      latitude: Some(55.75),
      longitude: Some(37.62),
      address: String::new(),
      category_id: None,
    }
  }

  #[test]
  fn accepts_a_sane_car() {
    assert!(validate_car_input(&input()).is_ok());
  }

  #[test]
  fn rejects_bad_fields() {
    let mut blank = input();
    blank.brand = "  ".to_string();
    assert!(validate_car_input(&blank).is_err());

    let mut old = input();
    old.year = 1900;
    assert!(validate_car_input(&old).is_err());

    let mut free = input();
    free.price_per_hour_cents = 0;
    assert!(validate_car_input(&free).is_err());

    let mut lost = input();
    lost.latitude = Some(91.0);
    assert!(validate_car_input(&lost).is_err());
  }
}
