// server/src/pipelines/expired_bookings_pipeline.rs

//! Completes active bookings whose end date has passed and frees their cars, then drops
//! expired sessions.

use crate::db::bookings::{self, StatusChange};
use crate::db::{cars, sessions};
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::ExpiredBookingsCtxData;
use crate::state::AppState;
use carshare_core::{BookingStatus, ContextData, Pipeline, PipelineControl, PipelineResult, Workflows};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

/// What one sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
  pub completed: usize,
  pub sessions_purged: u64,
}

pub fn register_expired_bookings_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<ExpiredBookingsCtxData, AppError>::new(
    "expired_bookings",
    &[("find_expired", false), ("complete_expired", false), ("purge_sessions", true)],
  );

  p.on("find_expired", |ctx: ContextData<ExpiredBookingsCtxData>| {
    Box::pin(async move {
      let (now, pool) = {
        let guard = ctx.read();
        (guard.now, guard.app_state.db_pool.clone())
      };
      let expired = bookings::find_expired_active(&pool, now).await?;
      info!(count = expired.len(), "Expired active bookings found.");
      ctx.write().expired = expired;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.skip_step_if("complete_expired", |ctx| ctx.read().expired.is_empty());

  p.on("complete_expired", |ctx: ContextData<ExpiredBookingsCtxData>| {
    Box::pin(async move {
      let (expired, now, pool) = {
        let guard = ctx.read();
        (guard.expired.clone(), guard.now, guard.app_state.db_pool.clone())
      };
      let mut completed = 0;
      for booking in expired {
        let ended = booking.period().is_ok_and(|period| period.has_ended(now));
        if booking.status.is_terminal() || !ended {
          warn!(booking_id = %booking.id, status = %booking.status, "Booking no longer due for completion.");
          continue;
        }
        if let Err(err) = booking.status.transition_to(BookingStatus::Completed) {
          warn!(booking_id = %booking.id, error = %err, "Skipping booking in the sweep.");
          continue;
        }
        let mut tx = pool.begin().await?;
        bookings::update_status(&mut *tx, booking.id, BookingStatus::Completed, StatusChange::default()).await?;
        cars::set_status(&mut *tx, booking.car_id, BookingStatus::Completed.car_status_after()).await?;
        tx.commit().await?;
        completed += 1;
      }
      info!(completed, "Expired bookings completed.");
      ctx.write().report.completed = completed;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on("purge_sessions", |ctx: ContextData<ExpiredBookingsCtxData>| {
    Box::pin(async move {
      let pool = ctx.read().app_state.db_pool.clone();
      let purged = sessions::purge_expired(&pool).await?;
      info!(purged, "Expired sessions purged.");
      ctx.write().report.sessions_purged = purged;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register(p);
  info!("Expired bookings pipeline registered.");
}

/// Runs the sweep as of now.
pub async fn run_sweep(app_state: &AppState) -> AppResult<SweepReport> {
  let ctx = ContextData::new(ExpiredBookingsCtxData {
    app_state: app_state.clone(),
    now: Utc::now(),
    expired: Vec::new(),
    report: SweepReport::default(),
  });
  let outcome = app_state.workflows.run(ctx.clone()).await?;
  let report = match outcome {
    PipelineResult::Completed => ctx.read().report,
    PipelineResult::Stopped => SweepReport::default(),
  };
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pipelines::test_support::{at, db_test_state, insert_test_booking, insert_test_car, insert_test_user};
  use carshare_core::{CarStatus, Role};

  #[tokio::test]
  async fn sweep_completes_ended_rentals_and_drops_expired_sessions() {
    let Some(state) = db_test_state().await else { return };
    let partner = insert_test_user(&state, Role::Partner).await;
    let client = insert_test_user(&state, Role::Client).await;
    let ended_car = insert_test_car(&state, &partner).await;
    let running_car = insert_test_car(&state, &partner).await;

    let ended = insert_test_booking(&state, &client, &ended_car, at("2001-01-01T10:00"), at("2001-01-01T12:00"), 2_000).await;
    let running = insert_test_booking(&state, &client, &running_car, at("2001-01-01T10:00"), at("2099-01-01T10:00"), 9_000).await;
    let stale_confirmed = insert_test_booking(&state, &client, &ended_car, at("2001-02-01T10:00"), at("2001-02-01T12:00"), 2_000).await;
    for (booking, car_id) in [(&ended, ended_car.id), (&running, running_car.id)] {
      bookings::update_status(&state.db_pool, booking.id, BookingStatus::Active, StatusChange::default())
        .await
        .unwrap();
      cars::set_status(&state.db_pool, car_id, CarStatus::Booked).await.unwrap();
    }

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, NOW() - INTERVAL '1 hour')")
      .bind("stale-token")
      .bind(client.id)
      .execute(&state.db_pool)
      .await
      .unwrap();
    sessions::create_session(&state.db_pool, "live-token", client.id, 1).await.unwrap();

    let report = run_sweep(&state).await.unwrap();
    assert_eq!(report, SweepReport { completed: 1, sessions_purged: 1 });

    for (booking, expected) in [
      (&ended, BookingStatus::Completed),
      (&running, BookingStatus::Active),
      (&stale_confirmed, BookingStatus::Confirmed),
    ] {
      let stored = bookings::get_booking(&state.db_pool, booking.id).await.unwrap().unwrap();
      assert_eq!(stored.status, expected);
    }
    assert_eq!(cars::get_car(&state.db_pool, ended_car.id).await.unwrap().unwrap().status, CarStatus::Available);
    assert_eq!(cars::get_car(&state.db_pool, running_car.id).await.unwrap().unwrap().status, CarStatus::Booked);
    assert!(sessions::find_user_by_token(&state.db_pool, "live-token").await.unwrap().is_some());

    let again = run_sweep(&state).await.unwrap();
    assert_eq!(again, SweepReport::default());
  }
}
