// server/src/pipelines/signup_pipeline.rs

use crate::db::{sessions, users};
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::{auth_service, notification_mock};
use carshare_core::{ContextData, Pipeline, PipelineControl, Role, Workflows};
use tracing::{event, info, warn, Level};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_NAME_LEN: usize = 30;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_DRIVER_LICENSE_LEN: usize = 50;

pub fn register_signup_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<SignupCtxData, AppError>::new(
    "signup",
    &[
      ("validate_signup_input", false),
      ("check_existing_user", false),
      ("create_user", false),
      ("issue_session", false),
      ("send_welcome_notification", true),
    ],
  );

  p.on("validate_signup_input", |ctx| Box::pin(validate_signup_input(ctx)));
  p.on("check_existing_user", |ctx| Box::pin(check_existing_user(ctx)));
  p.on("create_user", |ctx| Box::pin(create_user(ctx)));
  p.on("issue_session", |ctx| Box::pin(issue_session(ctx)));
  p.on("send_welcome_notification", |ctx| Box::pin(send_welcome_notification(ctx)));

  workflows.register(p);
  info!("Sign-up pipeline registered.");
}

/// Usernames: letters, digits and `@.+-_`, at most 150 characters.
pub fn validate_username(username: &str) -> AppResult<()> {
  if username.is_empty() {
    return Err(AppError::Validation("Username is required.".to_string()));
  }
  if username.chars().count() > MAX_USERNAME_LEN {
    return Err(AppError::Validation(format!(
      "Username must be at most {} characters.",
      MAX_USERNAME_LEN
    )));
  }
  if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
    return Err(AppError::Validation(
      "Username may contain only letters, digits and @/./+/-/_ characters.".to_string(),
    ));
  }
  Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
  let valid = match email.split_once('@') {
    Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
    None => false,
  };
  if valid && !email.contains(char::is_whitespace) {
    Ok(())
  } else {
    Err(AppError::Validation("Valid email is required.".to_string()))
  }
}

fn required_text(value: &str, label: &str, max_len: usize) -> AppResult<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(AppError::Validation(format!("{} is required.", label)));
  }
  if value.chars().count() > max_len {
    return Err(AppError::Validation(format!("{} must be at most {} characters.", label, max_len)));
  }
  Ok(value.to_string())
}

/// Blank optional fields are stored as absent.
fn optional_text(value: Option<&str>, label: &str, max_len: usize) -> AppResult<Option<String>> {
  match value.map(str::trim).filter(|v| !v.is_empty()) {
    Some(v) if v.chars().count() > max_len => Err(AppError::Validation(format!(
      "{} must be at most {} characters.",
      label, max_len
    ))),
    other => Ok(other.map(str::to_string)),
  }
}

async fn validate_signup_input(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (email, username, password) = {
    let guard = ctx.read();
    (guard.email.clone(), guard.username.clone(), guard.password.clone())
  };
  event!(Level::DEBUG, email = %email, "Validating sign-up input.");
  validate_email(&email)?;
  validate_username(&username)?;
  auth_service::validate_new_password(&password)?;

  let mut guard = ctx.write();
  guard.first_name = required_text(&guard.first_name, "First name", MAX_NAME_LEN)?;
  guard.last_name = required_text(&guard.last_name, "Last name", MAX_NAME_LEN)?;
  guard.phone = optional_text(guard.phone.as_deref(), "Phone number", MAX_PHONE_LEN)?;
  guard.driver_license = optional_text(guard.driver_license.as_deref(), "Driver license", MAX_DRIVER_LICENSE_LEN)?;
  Ok(PipelineControl::Continue)
}

async fn check_existing_user(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (email, username, pool) = {
    let guard = ctx.read();
    (guard.email.clone(), guard.username.clone(), guard.app_state.db_pool.clone())
  };
  match users::taken_identifier(&pool, &email, &username).await? {
    Some(field) => {
      warn!(field, "Sign-up with an identifier already in use.");
      Err(AppError::Validation(format!("A user with that {} already exists.", field)))
    }
    None => Ok(PipelineControl::Continue),
  }
}

async fn create_user(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (mut new_user, password, pool) = {
    let guard = ctx.read();
    (
      users::NewUser {
        email: guard.email.trim().to_string(),
        username: guard.username.clone(),
        password_hash: String::new(),
        first_name: guard.first_name.clone(),
        last_name: guard.last_name.clone(),
        phone: guard.phone.clone(),
        driver_license: guard.driver_license.clone(),
        role: Role::Client,
      },
      guard.password.clone(),
      guard.app_state.db_pool.clone(),
    )
  };
  new_user.password_hash = auth_service::hash_password(&password)?;
  let user = users::insert_user(&pool, &new_user)
    .await
    .map_err(|e| match e {
      AppError::Sqlx(err) => AppError::conflict_on_unique(err, "A user with that email or username already exists."),
      other => other,
    })?;
  info!(user_id = %user.id, "User created.");
  ctx.write().created_user = Some(user);
  Ok(PipelineControl::Continue)
}

async fn issue_session(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (user_id, pool, ttl) = {
    let guard = ctx.read();
    (
      guard.created_user.as_ref().map(|u| u.id),
      guard.app_state.db_pool.clone(),
      guard.app_state.config.session_ttl_hours,
    )
  };
  let user_id = user_id.ok_or_else(|| AppError::Internal("Session requested before user creation.".to_string()))?;
  let token = auth_service::generate_session_token();
  sessions::create_session(&pool, &token, user_id, ttl).await?;
  ctx.write().session_token = Some(token);
  Ok(PipelineControl::Continue)
}

async fn send_welcome_notification(ctx: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (email, name) = {
    let guard = ctx.read();
    let name = guard
      .created_user
      .as_ref()
      .map(|u| u.full_name())
      .unwrap_or_else(|| guard.username.clone());
    (guard.email.clone(), name)
  };
  notification_mock::send_mock_notification(
    &email,
    "Welcome to Carshare",
    &format!("Hi {}, your account is ready. Find a car and book it in a few clicks.", name),
  )
  .await?;
  ctx.write().welcome_sent = true;
  Ok(PipelineControl::Continue)
}
