// core/src/domain/status.rs

//! Closed status enumerations. With the `postgres` feature they map onto PostgreSQL enum types.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a unit-only status enum.
macro_rules! status_strings {
  ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
    impl $ty {
      pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

      pub fn as_str(self) -> &'static str {
        match self {
          $($ty::$variant => $text),+
        }
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl FromStr for $ty {
      type Err = DomainError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
          $($text => Ok($ty::$variant),)+
          other => Err(DomainError::Invalid(format!(
            "Unknown {} '{}'.",
            stringify!($ty),
            other
          ))),
        }
      }
    }
  };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "car_status", rename_all = "snake_case")
)]
pub enum CarStatus {
  Available,
  Booked,
  Maintenance,
  Unavailable,
}

status_strings!(CarStatus {
  Available => "available",
  Booked => "booked",
  Maintenance => "maintenance",
  Unavailable => "unavailable",
});

impl CarStatus {
  /// Only cars in `Available` can take a new booking.
  pub fn is_bookable(self) -> bool {
    self == CarStatus::Available
  }

  pub fn ensure_bookable(self) -> Result<(), DomainError> {
    if self.is_bookable() {
      Ok(())
    } else {
      Err(DomainError::CarUnavailable { status: self })
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "booking_status", rename_all = "snake_case")
)]
pub enum BookingStatus {
  Confirmed,
  Active,
  Completed,
  Cancelled,
}

status_strings!(BookingStatus {
  Confirmed => "confirmed",
  Active => "active",
  Completed => "completed",
  Cancelled => "cancelled",
});

impl BookingStatus {
  /// Statuses that occupy the car for their interval.
  pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Active];

  pub fn blocks_availability(self) -> bool {
    Self::BLOCKING.contains(&self)
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
  }

  pub fn can_transition_to(self, next: BookingStatus) -> bool {
    matches!(
      (self, next),
      (BookingStatus::Confirmed, BookingStatus::Active)
        | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        | (BookingStatus::Active, BookingStatus::Completed)
    )
  }

  /// Validates `self -> next` and returns `next`.
  pub fn transition_to(self, next: BookingStatus) -> Result<BookingStatus, DomainError> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(DomainError::IllegalTransition { from: self, to: next })
    }
  }

  /// Car status implied by a booking entering `self`.
  pub fn car_status_after(self) -> CarStatus {
    if self.blocks_availability() {
      CarStatus::Booked
    } else {
      CarStatus::Available
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "payment_type", rename_all = "snake_case")
)]
pub enum PaymentType {
  Prepayment,
  FullPayment,
  Fine,
  Refund,
}

status_strings!(PaymentType {
  Prepayment => "prepayment",
  FullPayment => "full_payment",
  Fine => "fine",
  Refund => "refund",
});

impl PaymentType {
  /// Types a client may initiate themselves.
  pub fn is_client_initiated(self) -> bool {
    matches!(self, PaymentType::Prepayment | PaymentType::FullPayment)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
pub enum PaymentStatus {
  Pending,
  Succeeded,
  Failed,
  Refunded,
}

status_strings!(PaymentStatus {
  Pending => "pending",
  Succeeded => "succeeded",
  Failed => "failed",
  Refunded => "refunded",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "chat_status", rename_all = "snake_case")
)]
pub enum ChatStatus {
  Open,
  Closed,
}

status_strings!(ChatStatus {
  Open => "open",
  Closed => "closed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(
  feature = "postgres",
  derive(sqlx::Type),
  sqlx(type_name = "payout_status", rename_all = "snake_case")
)]
pub enum PayoutStatus {
  Requested,
  Paid,
  Rejected,
}

status_strings!(PayoutStatus {
  Requested => "requested",
  Paid => "paid",
  Rejected => "rejected",
});

impl PayoutStatus {
  /// Requested and paid payouts both count against the partner's balance.
  pub fn reserves_balance(self) -> bool {
    matches!(self, PayoutStatus::Requested | PayoutStatus::Paid)
  }
}
