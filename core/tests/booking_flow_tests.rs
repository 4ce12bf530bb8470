// tests/booking_flow_tests.rs
//
// A booking-shaped pipeline built from the domain rules, run without a database.
mod common;

use common::*;
use carshare_core::booking::{conflicts_with, BookingPeriod};
use carshare_core::pricing::{rental_price, Rates};
use carshare_core::{BookingStatus, ContextData, DomainError, Pipeline, PipelineControl, PipelineResult, WorkflowError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serial_test::serial;

#[derive(Debug, thiserror::Error)]
enum BookingFlowError {
  #[error(transparent)]
  Workflow(#[from] WorkflowError),
  #[error(transparent)]
  Domain(#[from] DomainError),
}

#[derive(Debug, Clone)]
struct BookingDraft {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  now: DateTime<Utc>,
  rates: Rates,
  existing: Vec<(BookingPeriod, BookingStatus)>,
  period: Option<BookingPeriod>,
  price_cents: Option<i64>,
}

fn draft(start_h: i64, end_h: i64, existing: Vec<(BookingPeriod, BookingStatus)>) -> BookingDraft {
  let base = Utc.with_ymd_and_hms(2031, 3, 10, 0, 0, 0).unwrap();
  BookingDraft {
    start: base + Duration::hours(start_h),
    end: base + Duration::hours(end_h),
    now: base,
    rates: Rates {
      per_hour_cents: 300_00,
      per_day_cents: 2_400_00,
    },
    existing,
    period: None,
    price_cents: None,
  }
}

fn period(start_h: i64, end_h: i64) -> BookingPeriod {
  let base = Utc.with_ymd_and_hms(2031, 3, 10, 0, 0, 0).unwrap();
  BookingPeriod::new(base + Duration::hours(start_h), base + Duration::hours(end_h)).unwrap()
}

fn booking_pipeline() -> Pipeline<BookingDraft, BookingFlowError> {
  let mut p = Pipeline::new("booking_draft", &[("validate", false), ("check_overlap", false), ("price", false)]);

  p.on("validate", |ctx: ContextData<BookingDraft>| async move {
    let (start, end, now) = {
      let g = ctx.read();
      (g.start, g.end, g.now)
    };
    let period = BookingPeriod::for_new_booking(start, end, now)?;
    ctx.write().period = Some(period);
    Ok::<_, BookingFlowError>(PipelineControl::Continue)
  });

  p.on("check_overlap", |ctx: ContextData<BookingDraft>| async move {
    let g = ctx.read();
    let requested = g.period.expect("validated");
    if conflicts_with(&requested, g.existing.iter().map(|(p, s)| (p, *s))) {
      return Err(BookingFlowError::Domain(DomainError::Overlap));
    }
    Ok(PipelineControl::Continue)
  });

  p.on("price", |ctx: ContextData<BookingDraft>| async move {
    let mut g = ctx.write();
    let requested = g.period.expect("validated");
    g.price_cents = Some(rental_price(g.rates, &requested));
    Ok::<_, BookingFlowError>(PipelineControl::Continue)
  });

  p
}

#[tokio::test]
#[serial]
async fn test_free_slot_is_priced_hourly() {
  setup_tracing();
  let ctx = ContextData::new(draft(10, 14, vec![(period(6, 10), BookingStatus::Confirmed)]));
  let result = booking_pipeline().run(ctx.clone()).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(ctx.read().price_cents, Some(1_200_00));
}

#[tokio::test]
#[serial]
async fn test_long_rental_is_priced_daily() {
  setup_tracing();
  let ctx = ContextData::new(draft(2, 50, vec![]));
  booking_pipeline().run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().price_cents, Some(4_800_00));
}

#[tokio::test]
#[serial]
async fn test_overlap_is_rejected_unless_cancelled() {
  setup_tracing();
  let blocked = ContextData::new(draft(10, 14, vec![(period(12, 16), BookingStatus::Active)]));
  let err = booking_pipeline().run(blocked.clone()).await.unwrap_err();
  assert!(matches!(err, BookingFlowError::Domain(DomainError::Overlap)));
  assert_eq!(blocked.read().price_cents, None);

  let freed = ContextData::new(draft(10, 14, vec![(period(12, 16), BookingStatus::Cancelled)]));
  booking_pipeline().run(freed.clone()).await.unwrap();
  assert!(freed.read().price_cents.is_some());
}

#[tokio::test]
#[serial]
async fn test_invalid_dates_stop_before_overlap_check() {
  setup_tracing();
  let ctx = ContextData::new(draft(14, 10, vec![]));
  let err = booking_pipeline().run(ctx.clone()).await.unwrap_err();
  assert!(matches!(err, BookingFlowError::Domain(DomainError::EndBeforeStart)));
  assert!(ctx.read().period.is_none());
}
