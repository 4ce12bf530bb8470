// core/src/domain/review.rs

//! Review ratings and per-car averages.

use crate::domain::status::BookingStatus;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Ratings submitted with a review. Only `rating` is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
  pub rating: i32,
  pub car_rating: Option<i32>,
  pub partner_rating: Option<i32>,
}

impl Ratings {
  pub fn validate(&self) -> DomainResult<()> {
    check_rating("rating", self.rating)?;
    if let Some(v) = self.car_rating {
      check_rating("car_rating", v)?;
    }
    if let Some(v) = self.partner_rating {
      check_rating("partner_rating", v)?;
    }
    Ok(())
  }
}

fn check_rating(field: &'static str, value: i32) -> DomainResult<()> {
  if (MIN_RATING..=MAX_RATING).contains(&value) {
    Ok(())
  } else {
    Err(DomainError::RatingOutOfRange { field, value })
  }
}

/// A booking can be reviewed once, after it completed.
pub fn ensure_reviewable(status: BookingStatus, already_reviewed: bool) -> DomainResult<()> {
  if status != BookingStatus::Completed {
    return Err(DomainError::Invalid(
      "You can only review completed bookings.".to_string(),
    ));
  }
  if already_reviewed {
    return Err(DomainError::AlreadyReviewed);
  }
  Ok(())
}

/// Averages over a set of reviews. Optional ratings average only the reviews that carry them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingSummary {
  pub count: usize,
  pub average_rating: Option<f64>,
  pub average_car_rating: Option<f64>,
  pub average_partner_rating: Option<f64>,
}

impl RatingSummary {
  pub fn from_ratings<'a, I>(ratings: I) -> Self
  where
    I: IntoIterator<Item = &'a Ratings>,
  {
    let mut overall = Vec::new();
    let mut car = Vec::new();
    let mut partner = Vec::new();
    for r in ratings {
      overall.push(r.rating);
      car.extend(r.car_rating);
      partner.extend(r.partner_rating);
    }
    Self {
      count: overall.len(),
      average_rating: average(&overall),
      average_car_rating: average(&car),
      average_partner_rating: average(&partner),
    }
  }
}

fn average(values: &[i32]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  let sum: i64 = values.iter().map(|v| *v as i64).sum();
  let avg = sum as f64 / values.len() as f64;
  Some((avg * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn r(rating: i32, car: Option<i32>, partner: Option<i32>) -> Ratings {
    Ratings {
      rating,
      car_rating: car,
      partner_rating: partner,
    }
  }

  #[test]
  fn ratings_must_be_within_one_to_five() {
    assert!(r(1, None, None).validate().is_ok());
    assert!(r(5, Some(5), Some(1)).validate().is_ok());
    assert_eq!(
      r(0, None, None).validate(),
      Err(DomainError::RatingOutOfRange {
        field: "rating",
        value: 0
      })
    );
    assert_eq!(
      r(4, Some(6), None).validate(),
      Err(DomainError::RatingOutOfRange {
        field: "car_rating",
        value: 6
      })
    );
  }

  #[test]
  fn only_completed_unreviewed_bookings_are_reviewable() {
    assert!(ensure_reviewable(BookingStatus::Completed, false).is_ok());
    assert_eq!(
      ensure_reviewable(BookingStatus::Completed, true),
      Err(DomainError::AlreadyReviewed)
    );
    assert!(ensure_reviewable(BookingStatus::Active, false).is_err());
    assert!(ensure_reviewable(BookingStatus::Confirmed, false).is_err());
  }

  #[test]
  fn summary_skips_missing_optional_ratings() {
    let reviews = [r(5, Some(4), None), r(4, None, None), r(3, Some(5), Some(2))];
    let s = RatingSummary::from_ratings(&reviews);
    assert_eq!(s.count, 3);
    assert_eq!(s.average_rating, Some(4.0));
    assert_eq!(s.average_car_rating, Some(4.5));
    assert_eq!(s.average_partner_rating, Some(2.0));
    let none: [Ratings; 0] = [];
    assert_eq!(RatingSummary::from_ratings(&none), RatingSummary::default());
  }
}
