// core/src/domain/pricing.rs

//! Rental price computation. Amounts are integer minor units (cents).

use crate::domain::booking::BookingPeriod;
use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// A car's tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
  pub per_hour_cents: i64,
  pub per_day_cents: i64,
}

/// Up to and including 24 hours the hourly rate applies to the exact duration;
/// beyond that the daily rate applies to the duration in (fractional) days.
pub fn rental_price(rates: Rates, period: &BookingPeriod) -> i64 {
  let secs = period.duration_secs();
  if secs <= SECS_PER_DAY {
    div_round_half_up(rates.per_hour_cents as i128 * secs as i128, SECS_PER_HOUR as i128)
  } else {
    div_round_half_up(rates.per_day_cents as i128 * secs as i128, SECS_PER_DAY as i128)
  }
}

/// `percent` of `amount`, rounded half-up.
pub fn percent_of(amount_cents: i64, percent: u32) -> i64 {
  div_round_half_up(amount_cents as i128 * percent as i128, 100)
}

/// `1234.50`-style rendering of a minor-unit amount.
pub fn format_amount(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn div_round_half_up(numerator: i128, denominator: i128) -> i64 {
  let rounded = if numerator >= 0 {
    (numerator + denominator / 2) / denominator
  } else {
    (numerator - denominator / 2) / denominator
  };
  rounded as i64
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone, Utc};

  const CAMRY: Rates = Rates {
    per_hour_cents: 500_00,
    per_day_cents: 4_500_00,
  };

  fn period(minutes: i64) -> BookingPeriod {
    let start = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
    BookingPeriod::new(start, start + Duration::minutes(minutes)).unwrap()
  }

  #[test]
  fn short_rentals_use_the_hourly_rate() {
    assert_eq!(rental_price(CAMRY, &period(60)), 500_00);
    assert_eq!(rental_price(CAMRY, &period(150)), 1_250_00);
  }

  #[test]
  fn exactly_one_day_is_still_hourly() {
    assert_eq!(rental_price(CAMRY, &period(24 * 60)), 12_000_00);
  }

  #[test]
  fn longer_rentals_use_the_daily_rate_proportionally() {
    assert_eq!(rental_price(CAMRY, &period(48 * 60)), 9_000_00);
    assert_eq!(rental_price(CAMRY, &period(36 * 60)), 6_750_00);
  }

  #[test]
  fn rounds_to_the_nearest_cent() {
    let rates = Rates {
      per_hour_cents: 100,
      per_day_cents: 1_000,
    };
    // 100 cents/h for 20 minutes = 33.33.. cents
    assert_eq!(rental_price(rates, &period(20)), 33);
    // 100 cents/h for 39 minutes = 65 cents exactly
    assert_eq!(rental_price(rates, &period(39)), 65);
  }

  #[test]
  fn percentages_and_formatting() {
    assert_eq!(percent_of(1_000_01, 30), 30_000);
    assert_eq!(percent_of(5, 50), 3);
    assert_eq!(format_amount(1_250_05), "1250.05");
    assert_eq!(format_amount(-7), "-0.07");
  }
}
