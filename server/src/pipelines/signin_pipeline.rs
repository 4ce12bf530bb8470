// server/src/pipelines/signin_pipeline.rs

use crate::db::{sessions, users};
use crate::errors::AppError;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use carshare_core::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn register_signin_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<SigninCtxData, AppError>::new(
    "signin",
    &[
      ("validate_signin_input", false),
      ("fetch_user_by_email", false),
      ("verify_user_password", false),
      ("issue_session", false),
    ],
  );

  p.on("validate_signin_input", |ctx: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email_empty, password_empty) = {
        let guard = ctx.read();
        (guard.email.trim().is_empty(), guard.password.is_empty())
      };
      if email_empty {
        return Err(AppError::Validation("Email is required.".to_string()));
      }
      if password_empty {
        return Err(AppError::Validation("Password is required.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on("fetch_user_by_email", |ctx: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email, pool) = {
        let guard = ctx.read();
        (guard.email.trim().to_string(), guard.app_state.db_pool.clone())
      };
      event!(Level::DEBUG, email = %email, "Fetching user for sign-in.");
      match users::find_by_email(&pool, &email).await? {
        Some(user) => {
          ctx.write().user = Some(user);
          Ok(PipelineControl::Continue)
        }
        None => {
          warn!("Sign-in for unknown email.");
          Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
        }
      }
    })
  });

  p.on("verify_user_password", |ctx: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (hash, password, user_id) = {
        let guard = ctx.read();
        let user = guard
          .user
          .as_ref()
          .ok_or_else(|| AppError::Internal("Password check before user lookup.".to_string()))?;
        (user.password_hash.clone(), guard.password.clone(), user.id)
      };
      if auth_service::verify_password(&hash, &password)? {
        Ok(PipelineControl::Continue)
      } else {
        warn!(user_id = %user_id, "Password mismatch on sign-in.");
        Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
      }
    })
  });

  p.on("issue_session", |ctx: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (user_id, pool, ttl) = {
        let guard = ctx.read();
        (
          guard.user.as_ref().map(|u| u.id),
          guard.app_state.db_pool.clone(),
          guard.app_state.config.session_ttl_hours,
        )
      };
      let user_id = user_id.ok_or_else(|| AppError::Internal("Session requested without a user.".to_string()))?;
      let token = auth_service::generate_session_token();
      sessions::create_session(&pool, &token, user_id, ttl).await?;
      info!(user_id = %user_id, "Session issued.");
      ctx.write().session_token = Some(token);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register(p);
  info!("Sign-in pipeline registered.");
}
