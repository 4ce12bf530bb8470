// server/src/services/notification_mock.rs
use crate::errors::Result as AppResult;
use tracing::info;

#[derive(Debug)]
pub struct SentNotification {
  pub to: String,
  pub subject: String,
  pub message_id: String,
}

/// Pretends to e-mail `to`. Subjects containing `fail_test` fail, for exercising optional steps.
pub async fn send_mock_notification(to: &str, subject: &str, body: &str) -> AppResult<SentNotification> {
  info!(to, subject, body_len = body.len(), "Simulating notification delivery.");
  tokio::time::sleep(std::time::Duration::from_millis(10)).await;

  if subject.to_lowercase().contains("fail_test") {
    tracing::warn!("Simulated notification failure for subject: {}", subject);
    return Err(crate::errors::AppError::Internal("Simulated notification failure".to_string()));
  }

  Ok(SentNotification {
    to: to.to_string(),
    subject: subject.to_string(),
    message_id: format!("mock_msg_{}", uuid::Uuid::new_v4().simple()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn delivers_and_fails_on_demand() {
    let sent = send_mock_notification("client@example.com", "Booking confirmed", "Kia Rio").await.unwrap();
    assert_eq!(sent.to, "client@example.com");
    assert!(sent.message_id.starts_with("mock_msg_"));

    assert!(send_mock_notification("client@example.com", "FAIL_TEST welcome", "").await.is_err());
  }
}
