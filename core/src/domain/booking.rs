// core/src/domain/booking.rs

//! Booking periods, form validation and the overlap rule.

use crate::domain::status::BookingStatus;
use crate::error::{DomainError, DomainResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open rental interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPeriod {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
}

impl BookingPeriod {
  /// Fails with `EndBeforeStart` unless `start < end`.
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
    if start >= end {
      return Err(DomainError::EndBeforeStart);
    }
    Ok(Self { start, end })
  }

  /// The full booking-form check: ordered dates and a start that is not in the past.
  pub fn for_new_booking(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<Self> {
    let period = Self::new(start, end)?;
    if period.start < now {
      return Err(DomainError::StartInPast);
    }
    Ok(period)
  }

  pub fn start(&self) -> DateTime<Utc> {
    self.start
  }

  pub fn end(&self) -> DateTime<Utc> {
    self.end
  }

  pub fn duration_secs(&self) -> i64 {
    (self.end - self.start).num_seconds()
  }

  pub fn hours(&self) -> f64 {
    self.duration_secs() as f64 / 3600.0
  }

  /// `self.start < other.end && self.end > other.start`; touching intervals do not overlap.
  pub fn overlaps(&self, other: &BookingPeriod) -> bool {
    self.start < other.end && self.end > other.start
  }

  pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
    self.end < now
  }
}

/// Interval form of [`BookingPeriod::overlaps`] for rows read straight from the database.
pub fn overlaps(
  a_start: DateTime<Utc>,
  a_end: DateTime<Utc>,
  b_start: DateTime<Utc>,
  b_end: DateTime<Utc>,
) -> bool {
  a_start < b_end && a_end > b_start
}

/// True when `requested` collides with any booking that still occupies the car.
pub fn conflicts_with<'a, I>(requested: &BookingPeriod, existing: I) -> bool
where
  I: IntoIterator<Item = (&'a BookingPeriod, BookingStatus)>,
{
  existing
    .into_iter()
    .any(|(period, status)| status.blocks_availability() && requested.overlaps(period))
}

/// Parses the date formats the booking form and availability check accept:
/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 5, 1, h, 0, 0).unwrap()
  }

  #[test]
  fn rejects_unordered_dates() {
    assert_eq!(BookingPeriod::new(at(10), at(10)), Err(DomainError::EndBeforeStart));
    assert_eq!(BookingPeriod::new(at(11), at(10)), Err(DomainError::EndBeforeStart));
  }

  #[test]
  fn rejects_start_in_the_past() {
    let now = at(12);
    assert_eq!(
      BookingPeriod::for_new_booking(at(11), at(14), now),
      Err(DomainError::StartInPast)
    );
    assert!(BookingPeriod::for_new_booking(at(12), at(14), now).is_ok());
  }

  #[test]
  fn touching_intervals_do_not_overlap() {
    let morning = BookingPeriod::new(at(8), at(12)).unwrap();
    let afternoon = BookingPeriod::new(at(12), at(16)).unwrap();
    let lunch = BookingPeriod::new(at(11), at(13)).unwrap();
    assert!(!morning.overlaps(&afternoon));
    assert!(morning.overlaps(&lunch));
    assert!(afternoon.overlaps(&lunch));
    assert!(overlaps(at(8), at(12), at(9), at(10)));
  }

  #[test]
  fn finished_bookings_never_block() {
    let existing = BookingPeriod::new(at(8), at(12)).unwrap();
    let wanted = BookingPeriod::new(at(10), at(14)).unwrap();
    assert!(!conflicts_with(&wanted, [(&existing, BookingStatus::Cancelled)]));
    assert!(!conflicts_with(&wanted, [(&existing, BookingStatus::Completed)]));
    assert!(conflicts_with(&wanted, [(&existing, BookingStatus::Active)]));
    assert!(conflicts_with(
      &wanted,
      [(&existing, BookingStatus::Cancelled), (&existing, BookingStatus::Confirmed)]
    ));
  }

  #[test]
  fn parses_form_and_iso_dates() {
    assert_eq!(parse_datetime("2030-05-01T10:00"), Some(at(10)));
    assert_eq!(parse_datetime("2030-05-01T10:00:00Z"), Some(at(10)));
    assert_eq!(parse_datetime("2030-05-01T13:00:00+03:00"), Some(at(10)));
    assert_eq!(parse_datetime("tomorrow"), None);
  }

  #[test]
  fn duration_in_hours() {
    let p = BookingPeriod::new(at(10), at(10) + Duration::minutes(90)).unwrap();
    assert_eq!(p.duration_secs(), 5400);
    assert!((p.hours() - 1.5).abs() < f64::EPSILON);
  }
}
