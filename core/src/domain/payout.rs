// core/src/domain/payout.rs

use crate::domain::pricing::percent_of;
use crate::error::{DomainError, DomainResult};
use serde::Serialize;

/// A partner's earnings position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartnerBalance {
  pub earned_cents: i64,
  pub reserved_cents: i64,
  pub available_cents: i64,
}

impl PartnerBalance {
  /// `completed_revenue_cents` is the sum of final prices of the partner's completed bookings;
  /// `reserved_cents` the sum of requested and paid payouts.
  pub fn compute(completed_revenue_cents: i64, share_percent: u32, reserved_cents: i64) -> Self {
    let earned = percent_of(completed_revenue_cents, share_percent);
    Self {
      earned_cents: earned,
      reserved_cents,
      available_cents: (earned - reserved_cents).max(0),
    }
  }

  pub fn check_request(&self, amount_cents: i64) -> DomainResult<()> {
    if amount_cents <= 0 {
      return Err(DomainError::NonPositiveAmount);
    }
    if amount_cents > self.available_cents {
      return Err(DomainError::InsufficientBalance {
        requested: amount_cents,
        available: self.available_cents,
      });
    }
    Ok(())
  }
}
