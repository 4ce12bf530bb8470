// server/src/web/handlers/support_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::support;
use crate::errors::{AppError, Result as AppResult};
use crate::models::SupportChat;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use carshare_core::{ChatStatus, Permission};

pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 4000;

#[derive(Deserialize, Debug)]
pub struct ChatListQuery {
  pub status: Option<ChatStatus>,
}

#[derive(Deserialize, Debug)]
pub struct NewChatPayload {
  pub subject: String,
  pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct MessagePayload {
  pub body: String,
}

fn required_text(value: &str, field: &str, max_len: usize) -> AppResult<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(AppError::Validation(format!("{} is required.", field)));
  }
  if value.chars().count() > max_len {
    return Err(AppError::Validation(format!("{} must be at most {} characters.", field, max_len)));
  }
  Ok(value.to_string())
}

/// A chat the caller takes part in: its client, or any staff member.
async fn load_chat(app_state: &AppState, auth: &AuthenticatedUser, chat_id: Uuid) -> AppResult<SupportChat> {
  support::get_chat(&app_state.db_pool, chat_id)
    .await?
    .filter(|chat| auth.user.role.is_staff() || chat.client_id == auth.user.id)
    .ok_or_else(|| AppError::NotFound("Chat not found.".to_string()))
}

#[instrument(name = "handler::list_chats", skip(app_state, auth), fields(user_id = %auth.user.id))]
pub async fn list_chats_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<ChatListQuery>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ViewSupportChat)?;
  let chats = if auth.user.role.is_staff() {
    support::list_all(&app_state.db_pool, query.status).await?
  } else {
    support::list_for_client(&app_state.db_pool, auth.user.id).await?
  };
  Ok(HttpResponse::Ok().json(chats))
}

#[instrument(name = "handler::open_chat", skip(app_state, auth, payload), fields(user_id = %auth.user.id))]
pub async fn open_chat_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  payload: web::Json<NewChatPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::AddSupportChat)?;
  let subject = required_text(&payload.subject, "Subject", MAX_SUBJECT_LEN)?;
  let message = required_text(&payload.message, "Message", MAX_MESSAGE_LEN)?;
  let (chat, first) = support::create_chat(&app_state.db_pool, auth.user.id, &subject, &message).await?;
  info!(chat_id = %chat.id, "Support chat opened.");
  Ok(HttpResponse::Created().json(json!({ "chat": chat, "messages": [first] })))
}

#[instrument(name = "handler::chat_detail", skip(app_state, auth), fields(chat_id = %path.as_ref()))]
pub async fn chat_detail_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ViewSupportMessage)?;
  let chat = load_chat(&app_state, &auth, path.into_inner()).await?;
  let messages = support::list_messages(&app_state.db_pool, chat.id).await?;
  Ok(HttpResponse::Ok().json(json!({ "chat": chat, "messages": messages })))
}

#[instrument(name = "handler::post_message", skip(app_state, auth, payload), fields(chat_id = %path.as_ref()))]
pub async fn post_message_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<MessagePayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::AddSupportMessage)?;
  let body = required_text(&payload.body, "Message", MAX_MESSAGE_LEN)?;
  let chat = load_chat(&app_state, &auth, path.into_inner()).await?;
  if chat.status == ChatStatus::Closed {
    return Err(AppError::Conflict("This chat is closed.".to_string()));
  }
  let message = support::add_message(
    &app_state.db_pool,
    chat.id,
    auth.user.id,
    &body,
    auth.user.role.is_staff(),
  )
  .await?;
  Ok(HttpResponse::Created().json(message))
}

#[instrument(name = "handler::close_chat", skip(app_state, auth), fields(chat_id = %path.as_ref()))]
pub async fn close_chat_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(Permission::ChangeSupportChat)?;
  let chat = load_chat(&app_state, &auth, path.into_inner()).await?;
  if chat.status == ChatStatus::Closed {
    return Ok(HttpResponse::Ok().json(chat));
  }
  let closed = support::close_chat(&app_state.db_pool, chat.id)
    .await?
    .ok_or_else(|| AppError::NotFound("Chat not found.".to_string()))?;
  info!(chat_id = %closed.id, "Support chat closed.");
  Ok(HttpResponse::Ok().json(closed))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_fields_are_trimmed_and_bounded() {
    assert_eq!(required_text("  hello ", "Subject", 10).unwrap(), "hello");
    assert!(matches!(required_text("   ", "Subject", 10), Err(AppError::Validation(m)) if m == "Subject is required."));
    assert!(required_text("abcdefghijk", "Subject", 10).is_err());
  }
}
