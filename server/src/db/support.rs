// server/src/db/support.rs

use crate::errors::Result as AppResult;
use crate::models::{SupportChat, SupportMessage};
use carshare_core::ChatStatus;
use sqlx::PgPool;
use uuid::Uuid;

const CHAT_COLUMNS: &str = "id, client_id, subject, status, manager_id, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, body, created_at";

pub async fn list_for_client(pool: &PgPool, client_id: Uuid) -> AppResult<Vec<SupportChat>> {
  let sql = format!(
    "SELECT {} FROM support_chats WHERE client_id = $1 ORDER BY updated_at DESC",
    CHAT_COLUMNS
  );
  Ok(sqlx::query_as::<_, SupportChat>(&sql).bind(client_id).fetch_all(pool).await?)
}

pub async fn list_all(pool: &PgPool, status: Option<ChatStatus>) -> AppResult<Vec<SupportChat>> {
  let sql = format!(
    "SELECT {} FROM support_chats WHERE ($1::chat_status IS NULL OR status = $1) ORDER BY updated_at DESC",
    CHAT_COLUMNS
  );
  Ok(sqlx::query_as::<_, SupportChat>(&sql).bind(status).fetch_all(pool).await?)
}

pub async fn get_chat(pool: &PgPool, id: Uuid) -> AppResult<Option<SupportChat>> {
  let sql = format!("SELECT {} FROM support_chats WHERE id = $1", CHAT_COLUMNS);
  Ok(sqlx::query_as::<_, SupportChat>(&sql).bind(id).fetch_optional(pool).await?)
}

/// Opens a chat together with its first message.
pub async fn create_chat(pool: &PgPool, client_id: Uuid, subject: &str, first_message: &str) -> AppResult<(SupportChat, SupportMessage)> {
  let mut tx = pool.begin().await?;
  let sql = format!(
    "INSERT INTO support_chats (client_id, subject) VALUES ($1, $2) RETURNING {}",
    CHAT_COLUMNS
  );
  let chat = sqlx::query_as::<_, SupportChat>(&sql)
    .bind(client_id)
    .bind(subject)
    .fetch_one(&mut *tx)
    .await?;
  let sql = format!(
    "INSERT INTO support_messages (chat_id, sender_id, body) VALUES ($1, $2, $3) RETURNING {}",
    MESSAGE_COLUMNS
  );
  let message = sqlx::query_as::<_, SupportMessage>(&sql)
    .bind(chat.id)
    .bind(client_id)
    .bind(first_message)
    .fetch_one(&mut *tx)
    .await?;
  tx.commit().await?;
  Ok((chat, message))
}

pub async fn list_messages(pool: &PgPool, chat_id: Uuid) -> AppResult<Vec<SupportMessage>> {
  let sql = format!(
    "SELECT {} FROM support_messages WHERE chat_id = $1 ORDER BY created_at ASC",
    MESSAGE_COLUMNS
  );
  Ok(sqlx::query_as::<_, SupportMessage>(&sql).bind(chat_id).fetch_all(pool).await?)
}

/// Appends a message. A staff sender becomes the chat's manager if none is assigned yet.
pub async fn add_message(pool: &PgPool, chat_id: Uuid, sender_id: Uuid, body: &str, sender_is_staff: bool) -> AppResult<SupportMessage> {
  let mut tx = pool.begin().await?;
  let sql = format!(
    "INSERT INTO support_messages (chat_id, sender_id, body) VALUES ($1, $2, $3) RETURNING {}",
    MESSAGE_COLUMNS
  );
  let message = sqlx::query_as::<_, SupportMessage>(&sql)
    .bind(chat_id)
    .bind(sender_id)
    .bind(body)
    .fetch_one(&mut *tx)
    .await?;
  sqlx::query(
    "UPDATE support_chats SET updated_at = NOW(), \
       manager_id = CASE WHEN $3 AND manager_id IS NULL THEN $2 ELSE manager_id END \
     WHERE id = $1",
  )
  .bind(chat_id)
  .bind(sender_id)
  .bind(sender_is_staff)
  .execute(&mut *tx)
  .await?;
  tx.commit().await?;
  Ok(message)
}

pub async fn close_chat(pool: &PgPool, id: Uuid) -> AppResult<Option<SupportChat>> {
  let sql = format!(
    "UPDATE support_chats SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
    CHAT_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, SupportChat>(&sql)
      .bind(id)
      .bind(ChatStatus::Closed)
      .fetch_optional(pool)
      .await?,
  )
}
