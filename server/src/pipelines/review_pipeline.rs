// server/src/pipelines/review_pipeline.rs

use crate::db::{bookings, reviews};
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::ReviewCtxData;
use carshare_core::review::ensure_reviewable;
use carshare_core::{ContextData, Permission, Pipeline, PipelineControl, Workflows};
use tracing::info;

pub const MAX_COMMENT_LEN: usize = 2000;

pub fn register_review_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<ReviewCtxData, AppError>::new(
    "review",
    &[
      ("validate_review", false),
      ("load_booking", false),
      ("check_reviewable", false),
      ("save_review", false),
    ],
  );

  p.on("validate_review", |ctx| Box::pin(validate_review(ctx)));
  p.on("load_booking", |ctx| Box::pin(load_booking(ctx)));
  p.on("check_reviewable", |ctx| Box::pin(check_reviewable(ctx)));
  p.on("save_review", |ctx| Box::pin(save_review(ctx)));

  workflows.register(p);
  info!("Review pipeline registered.");
}

async fn validate_review(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let guard = ctx.read();
  if !guard.client.role.can(Permission::AddReview) {
    return Err(AppError::Forbidden("Your role cannot leave reviews.".to_string()));
  }
  guard.ratings.validate()?;
  if guard.comment.chars().count() > MAX_COMMENT_LEN {
    return Err(AppError::Validation(format!(
      "Comment must be at most {} characters.",
      MAX_COMMENT_LEN
    )));
  }
  Ok(PipelineControl::Continue)
}

async fn load_booking(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (booking_id, client_id, pool) = {
    let guard = ctx.read();
    (guard.booking_id, guard.client.id, guard.app_state.db_pool.clone())
  };
  let booking = bookings::get_booking(&pool, booking_id)
    .await?
    .filter(|b| b.client_id == client_id)
    .ok_or_else(|| AppError::NotFound("Booking not found.".to_string()))?;
  ctx.write().booking = Some(booking);
  Ok(PipelineControl::Continue)
}

async fn check_reviewable(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (booking, pool) = {
    let guard = ctx.read();
    (guard.booking.clone(), guard.app_state.db_pool.clone())
  };
  let booking = booking.ok_or_else(|| AppError::Internal("Review checked before booking load.".to_string()))?;
  let already_reviewed = reviews::exists_for_booking(&pool, booking.id).await?;
  ensure_reviewable(booking.status, already_reviewed)?;
  Ok(PipelineControl::Continue)
}

async fn save_review(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (booking_id, ratings, comment, pool) = {
    let guard = ctx.read();
    (guard.booking_id, guard.ratings, guard.comment.trim().to_string(), guard.app_state.db_pool.clone())
  };
  let review = reviews::insert_review(&pool, booking_id, &ratings, &comment).await?;
  info!(review_id = %review.id, booking_id = %booking_id, rating = review.rating, "Review saved.");
  ctx.write().review = Some(review);
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pipelines::test_support::{test_state, test_user};
  use carshare_core::review::Ratings;
  use carshare_core::Role;
  use uuid::Uuid;

  fn review_ctx(state: &crate::state::AppState, role: Role, ratings: Ratings) -> ContextData<ReviewCtxData> {
    ContextData::new(ReviewCtxData {
      app_state: state.clone(),
      client: test_user(role),
      booking_id: Uuid::new_v4(),
      ratings,
      comment: "Clean car".to_string(),
      booking: None,
      review: None,
    })
  }

  #[tokio::test]
  async fn out_of_range_rating_is_rejected_before_lookup() {
    let state = test_state();
    register_review_pipeline(&state.workflows);
    let ratings = Ratings {
      rating: 6,
      car_rating: None,
      partner_rating: None,
    };
    let ctx = review_ctx(&state, Role::Client, ratings);
    let err = state.workflows.run(ctx.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(ctx.read().booking.is_none());
  }

  #[tokio::test]
  async fn partners_cannot_review() {
    let state = test_state();
    register_review_pipeline(&state.workflows);
    let ratings = Ratings {
      rating: 5,
      car_rating: Some(5),
      partner_rating: None,
    };
    let err = state.workflows.run(review_ctx(&state, Role::Partner, ratings)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
  }
}
