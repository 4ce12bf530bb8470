// server/src/pipelines/payout_pipeline.rs

use crate::db::payouts;
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::PayoutRequestCtxData;
use carshare_core::payout::PartnerBalance;
use carshare_core::{ContextData, DomainError, Permission, Pipeline, PipelineControl, Workflows};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

pub fn register_payout_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<PayoutRequestCtxData, AppError>::new(
    "payout_request",
    &[
      ("validate_payout_request", false),
      ("compute_balance", false),
      ("reserve_payout", false),
    ],
  );

  p.on("validate_payout_request", |ctx: ContextData<PayoutRequestCtxData>| {
    Box::pin(async move {
      let guard = ctx.read();
      if !guard.partner.role.can(Permission::AddPartnerPayout) {
        return Err(AppError::Forbidden("Only partners can request payouts.".to_string()));
      }
      if guard.amount_cents <= 0 {
        return Err(DomainError::NonPositiveAmount.into());
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on("compute_balance", |ctx: ContextData<PayoutRequestCtxData>| {
    Box::pin(async move {
      let (partner_id, share, pool) = {
        let guard = ctx.read();
        (
          guard.partner.id,
          guard.app_state.config.partner_share_percent,
          guard.app_state.db_pool.clone(),
        )
      };
      let balance = partner_balance(&pool, partner_id, share).await?;
      ctx.write().balance = Some(balance);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Balance is re-read under a per-partner advisory lock before the insert.
  p.on("reserve_payout", |ctx: ContextData<PayoutRequestCtxData>| {
    Box::pin(async move {
      let (partner_id, amount, share, pool) = {
        let guard = ctx.read();
        (
          guard.partner.id,
          guard.amount_cents,
          guard.app_state.config.partner_share_percent,
          guard.app_state.db_pool.clone(),
        )
      };
      let mut tx = pool.begin().await?;
      sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(partner_id)
        .execute(&mut *tx)
        .await?;
      let revenue = payouts::completed_revenue(&mut *tx, partner_id).await?;
      let reserved = payouts::reserved_total(&mut *tx, partner_id).await?;
      let balance = PartnerBalance::compute(revenue, share, reserved);
      if let Err(err) = balance.check_request(amount) {
        warn!(partner_id = %partner_id, amount_cents = amount, available_cents = balance.available_cents, "Payout request over balance.");
        return Err(err.into());
      }
      let payout = payouts::insert_payout(&mut *tx, partner_id, amount).await?;
      tx.commit().await?;
      info!(payout_id = %payout.id, partner_id = %partner_id, amount_cents = amount, "Payout requested.");
      {
        let mut guard = ctx.write();
        guard.balance = Some(PartnerBalance::compute(revenue, share, reserved + amount));
        guard.payout = Some(payout);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register(p);
  info!("Payout request pipeline registered.");
}

pub async fn partner_balance(pool: &PgPool, partner_id: Uuid, share_percent: u32) -> AppResult<PartnerBalance> {
  let revenue = payouts::completed_revenue(pool, partner_id).await?;
  let reserved = payouts::reserved_total(pool, partner_id).await?;
  Ok(PartnerBalance::compute(revenue, share_percent, reserved))
}
