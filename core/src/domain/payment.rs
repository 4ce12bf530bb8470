// core/src/domain/payment.rs

//! How much a client owes for a booking.

use crate::domain::pricing::percent_of;
use crate::domain::status::{BookingStatus, PaymentStatus, PaymentType};
use crate::error::{DomainError, DomainResult};

/// A payment row reduced to what the balance computation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentEntry {
  pub amount_cents: i64,
  pub payment_type: PaymentType,
  pub status: PaymentStatus,
}

/// Sum of succeeded prepayments and full payments.
pub fn paid_total<'a, I>(payments: I) -> i64
where
  I: IntoIterator<Item = &'a PaymentEntry>,
{
  payments
    .into_iter()
    .filter(|p| p.status == PaymentStatus::Succeeded && p.payment_type.is_client_initiated())
    .map(|p| p.amount_cents)
    .sum()
}

pub fn outstanding(final_price_cents: i64, paid_cents: i64) -> i64 {
  (final_price_cents - paid_cents).max(0)
}

/// Amount charged for a client-initiated payment.
///
/// A prepayment is `prepayment_percent` of the final price, capped at what is still owed.
/// A full payment settles the outstanding balance.
pub fn amount_due(
  payment_type: PaymentType,
  booking_status: BookingStatus,
  final_price_cents: i64,
  paid_cents: i64,
  prepayment_percent: u32,
) -> DomainResult<i64> {
  if !payment_type.is_client_initiated() {
    return Err(DomainError::Invalid(format!(
      "Payment type '{}' cannot be initiated by a client.",
      payment_type
    )));
  }
  if booking_status == BookingStatus::Cancelled {
    return Err(DomainError::Invalid(
      "Cancelled bookings cannot be paid.".to_string(),
    ));
  }
  let owed = outstanding(final_price_cents, paid_cents);
  if owed == 0 {
    return Err(DomainError::NothingOutstanding);
  }
  let amount = match payment_type {
    PaymentType::Prepayment => {
      if paid_cents > 0 {
        return Err(DomainError::Invalid(
          "A payment has already been made for this booking.".to_string(),
        ));
      }
      percent_of(final_price_cents, prepayment_percent).min(owed)
    }
    _ => owed,
  };
  if amount <= 0 {
    return Err(DomainError::NonPositiveAmount);
  }
  Ok(amount)
}

/// Staff-entered fines must be positive.
pub fn validate_fine(amount_cents: i64) -> DomainResult<i64> {
  if amount_cents <= 0 {
    Err(DomainError::NonPositiveAmount)
  } else {
    Ok(amount_cents)
  }
}

/// Only succeeded, non-refund payments can be refunded.
pub fn ensure_refundable(entry: &PaymentEntry) -> DomainResult<()> {
  if entry.payment_type == PaymentType::Refund {
    return Err(DomainError::Invalid("A refund cannot be refunded.".to_string()));
  }
  if entry.status != PaymentStatus::Succeeded {
    return Err(DomainError::Invalid(format!(
      "Only succeeded payments can be refunded (status is '{}').",
      entry.status
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(amount: i64, t: PaymentType, s: PaymentStatus) -> PaymentEntry {
    PaymentEntry {
      amount_cents: amount,
      payment_type: t,
      status: s,
    }
  }

  #[test]
  fn paid_total_counts_succeeded_client_payments_only() {
    let rows = [
      entry(300, PaymentType::Prepayment, PaymentStatus::Succeeded),
      entry(700, PaymentType::FullPayment, PaymentStatus::Failed),
      entry(50, PaymentType::Fine, PaymentStatus::Succeeded),
      entry(200, PaymentType::FullPayment, PaymentStatus::Refunded),
    ];
    assert_eq!(paid_total(&rows), 300);
  }

  #[test]
  fn prepayment_is_a_share_of_the_final_price() {
    let due = amount_due(PaymentType::Prepayment, BookingStatus::Confirmed, 10_000, 0, 30);
    assert_eq!(due, Ok(3_000));
  }

  #[test]
  fn second_prepayment_is_rejected() {
    let due = amount_due(PaymentType::Prepayment, BookingStatus::Confirmed, 10_000, 3_000, 30);
    assert!(matches!(due, Err(DomainError::Invalid(_))));
  }

  #[test]
  fn full_payment_settles_the_rest() {
    let due = amount_due(PaymentType::FullPayment, BookingStatus::Active, 10_000, 3_000, 30);
    assert_eq!(due, Ok(7_000));
    let done = amount_due(PaymentType::FullPayment, BookingStatus::Completed, 10_000, 10_000, 30);
    assert_eq!(done, Err(DomainError::NothingOutstanding));
  }

  #[test]
  fn clients_cannot_issue_fines_or_pay_cancelled_bookings() {
    assert!(amount_due(PaymentType::Fine, BookingStatus::Active, 10_000, 0, 30).is_err());
    assert!(amount_due(PaymentType::FullPayment, BookingStatus::Cancelled, 10_000, 0, 30).is_err());
  }

  #[test]
  fn refund_rules() {
    assert!(ensure_refundable(&entry(1, PaymentType::FullPayment, PaymentStatus::Succeeded)).is_ok());
    assert!(ensure_refundable(&entry(1, PaymentType::FullPayment, PaymentStatus::Pending)).is_err());
    assert!(ensure_refundable(&entry(1, PaymentType::Refund, PaymentStatus::Succeeded)).is_err());
    assert_eq!(validate_fine(0), Err(DomainError::NonPositiveAmount));
  }
}
