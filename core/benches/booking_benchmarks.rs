use carshare_core::booking::{conflicts_with, BookingPeriod};
use carshare_core::pricing::{rental_price, Rates};
use carshare_core::{BookingStatus, ContextData, Pipeline, PipelineControl, WorkflowError};
use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
}

fn existing_bookings(n: usize) -> Vec<(BookingPeriod, BookingStatus)> {
  let base = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
  (0..n)
    .map(|i| {
      let start = base + Duration::hours(i as i64 * 5);
      let status = if i % 4 == 0 {
        BookingStatus::Cancelled
      } else {
        BookingStatus::Confirmed
      };
      (BookingPeriod::new(start, start + Duration::hours(4)).unwrap(), status)
    })
    .collect()
}

fn bench_overlap_scan(c: &mut Criterion) {
  let mut group = c.benchmark_group("overlap_scan");
  let base = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
  // Lands in the gap after the last booking, so every row is inspected.
  for n in [10usize, 100, 1_000] {
    let existing = existing_bookings(n);
    let start = base + Duration::hours(n as i64 * 5 - 1);
    let requested = BookingPeriod::new(start, start + Duration::minutes(30)).unwrap();
    group.throughput(Throughput::Elements(n as u64));
    group.bench_with_input(BenchmarkId::from_parameter(n), &existing, |b, existing| {
      b.iter(|| conflicts_with(&requested, existing.iter().map(|(p, s)| (p, *s))))
    });
  }
  group.finish();
}

fn bench_pricing(c: &mut Criterion) {
  let rates = Rates {
    per_hour_cents: 500_00,
    per_day_cents: 4_500_00,
  };
  let base = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
  let periods: Vec<BookingPeriod> = (1..=96)
    .map(|h| BookingPeriod::new(base, base + Duration::hours(h)).unwrap())
    .collect();
  c.bench_function("rental_price_1h_to_4d", |b| {
    b.iter(|| periods.iter().map(|p| rental_price(rates, p)).sum::<i64>())
  });
}

fn bench_pipeline_run(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();
  let mut group = c.benchmark_group("pipeline_run");
  for steps in [1usize, 5, 10] {
    let names: Vec<String> = (0..steps).map(|i| format!("step{}", i)).collect();
    let defs: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), false)).collect();
    let mut pipeline = Pipeline::<BenchContext, WorkflowError>::new("bench", &defs);
    for name in &names {
      pipeline.on(name, |ctx: ContextData<BenchContext>| async move {
        ctx.write().counter += 1;
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      });
    }
    group.bench_with_input(BenchmarkId::from_parameter(steps), &pipeline, |b, pipeline| {
      b.to_async(&rt).iter(|| async {
        let ctx = ContextData::new(BenchContext::default());
        pipeline.run(ctx).await.unwrap()
      })
    });
  }
  group.finish();
}

criterion_group!(benches, bench_overlap_scan, bench_pricing, bench_pipeline_run);
criterion_main!(benches);
