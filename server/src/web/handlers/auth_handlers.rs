// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::db::sessions;
use crate::errors::AppError;
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use carshare_core::{ContextData, PipelineResult};

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub email: String,
  pub username: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub phone: Option<String>,
  pub driver_license: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

#[instrument(name = "handler::register", skip(app_state, payload), fields(req_email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    username: payload.username,
    password: payload.password,
    first_name: payload.first_name,
    last_name: payload.last_name,
    phone: payload.phone,
    driver_license: payload.driver_license,
    created_user: None,
    session_token: None,
    welcome_sent: false,
  });

  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let data = ctx.snapshot();
      let (user, token) = data
        .created_user
        .zip(data.session_token)
        .ok_or_else(|| AppError::Internal("Sign-up completed without a user or session.".to_string()))?;
      info!(user_id = %user.id, welcome_sent = data.welcome_sent, "User registered.");
      Ok(HttpResponse::Created().json(json!({
        "user": user,
        "token": token,
        "welcome_sent": data.welcome_sent,
      })))
    }
    PipelineResult::Stopped => {
      warn!("Sign-up pipeline stopped before completion.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(req_email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx = ContextData::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    session_token: None,
  });

  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let data = ctx.snapshot();
      let (user, token) = data
        .user
        .zip(data.session_token)
        .ok_or_else(|| AppError::Auth("Sign-in completed without a session.".to_string()))?;
      info!(user_id = %user.id, "User signed in.");
      Ok(HttpResponse::Ok().json(json!({ "user": user, "token": token })))
    }
    PipelineResult::Stopped => Err(AppError::Auth("Authentication was halted.".to_string())),
  }
}

#[instrument(name = "handler::logout", skip_all, fields(user_id = %auth.user.id))]
pub async fn logout_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  sessions::delete_session(&app_state.db_pool, &auth.token).await?;
  Ok(HttpResponse::NoContent().finish())
}
