// server/src/services/payment_mock.rs

//! In-process stand-in for a card payment gateway.

use crate::errors::{AppError, Result as AppResult};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentStatus {
  RequiresConfirmation,
  Succeeded,
  Failed,
}

#[derive(Debug, Clone)]
pub struct MockPaymentIntent {
  pub id: String,
  pub booking_id: Uuid,
  pub amount_cents: i64,
  pub status: IntentStatus,
  pub account_id_used: String,
}

/// Amounts whose last three digits are `123` are declined on confirmation.
const DECLINE_SUFFIX: i64 = 123;

#[instrument(skip(account_id), fields(payment_account_id = %account_id))]
pub async fn create_mock_payment_intent(booking_id: Uuid, amount_cents: i64, account_id: &str) -> AppResult<MockPaymentIntent> {
  info!("Simulating creation of payment intent.");
  if amount_cents <= 0 {
    return Err(AppError::Payment("Amount must be greater than zero".to_string()));
  }
  tokio::time::sleep(std::time::Duration::from_millis(20)).await;

  Ok(MockPaymentIntent {
    id: format!("mock_pi_{}", Uuid::new_v4().simple()),
    booking_id,
    amount_cents,
    status: IntentStatus::RequiresConfirmation,
    account_id_used: account_id.to_string(),
  })
}

#[instrument(skip(intent), fields(payment_intent_id = %intent.id, amount_cents = intent.amount_cents))]
pub async fn confirm_mock_payment(intent: &mut MockPaymentIntent) -> AppResult<()> {
  tokio::time::sleep(std::time::Duration::from_millis(30)).await;

  if intent.amount_cents % 1000 == DECLINE_SUFFIX {
    intent.status = IntentStatus::Failed;
    info!("Mock payment declined.");
    Err(AppError::Payment("The card was declined by the payment provider.".to_string()))
  } else {
    intent.status = IntentStatus::Succeeded;
    info!("Mock payment succeeded.");
    Ok(())
  }
}

/// Reverses a captured charge, returning the refund's transaction id.
#[instrument]
pub async fn refund_mock_payment(original_transaction_id: &str, amount_cents: i64) -> AppResult<String> {
  if amount_cents <= 0 {
    return Err(AppError::Payment("Refund amount must be greater than zero".to_string()));
  }
  tokio::time::sleep(std::time::Duration::from_millis(20)).await;
  let refund_id = format!("mock_re_{}", Uuid::new_v4().simple());
  info!(refund_id = %refund_id, "Mock refund issued.");
  Ok(refund_id)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn successful_charge() {
    let mut intent = create_mock_payment_intent(Uuid::new_v4(), 45_000, "acct").await.unwrap();
    assert_eq!(intent.status, IntentStatus::RequiresConfirmation);
    confirm_mock_payment(&mut intent).await.unwrap();
    assert_eq!(intent.status, IntentStatus::Succeeded);
    assert!(intent.id.starts_with("mock_pi_"));
  }

  #[tokio::test]
  async fn declined_charge() {
    let mut intent = create_mock_payment_intent(Uuid::new_v4(), 7_123, "acct").await.unwrap();
    let err = confirm_mock_payment(&mut intent).await.unwrap_err();
    assert!(matches!(err, AppError::Payment(_)));
    assert_eq!(intent.status, IntentStatus::Failed);
  }

  #[tokio::test]
  async fn zero_amounts_are_refused() {
    assert!(create_mock_payment_intent(Uuid::new_v4(), 0, "acct").await.is_err());
    assert!(refund_mock_payment("mock_pi_x", 0).await.is_err());
    assert!(refund_mock_payment("mock_pi_x", 10).await.unwrap().starts_with("mock_re_"));
  }
}
