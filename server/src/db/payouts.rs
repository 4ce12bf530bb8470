// server/src/db/payouts.rs

use crate::errors::Result as AppResult;
use crate::models::PartnerPayout;
use carshare_core::PayoutStatus;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const PAYOUT_COLUMNS: &str = "id, partner_id, amount_cents, status, processed_by, requested_at, processed_at";

/// Payout statuses that count against a partner's balance, for `status IN (...)` clauses.
pub fn reserving_statuses_sql() -> String {
  PayoutStatus::ALL
    .iter()
    .filter(|s| s.reserves_balance())
    .map(|s| format!("'{}'", s.as_str()))
    .collect::<Vec<_>>()
    .join(", ")
}

pub async fn list_for_partner(pool: &PgPool, partner_id: Uuid) -> AppResult<Vec<PartnerPayout>> {
  let sql = format!(
    "SELECT {} FROM partner_payouts WHERE partner_id = $1 ORDER BY requested_at DESC",
    PAYOUT_COLUMNS
  );
  Ok(sqlx::query_as::<_, PartnerPayout>(&sql).bind(partner_id).fetch_all(pool).await?)
}

pub async fn list_all(pool: &PgPool, status: Option<PayoutStatus>) -> AppResult<Vec<PartnerPayout>> {
  let sql = format!(
    "SELECT {} FROM partner_payouts WHERE ($1::payout_status IS NULL OR status = $1) ORDER BY requested_at DESC",
    PAYOUT_COLUMNS
  );
  Ok(sqlx::query_as::<_, PartnerPayout>(&sql).bind(status).fetch_all(pool).await?)
}

pub async fn get_payout<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<PartnerPayout>> {
  let sql = format!("SELECT {} FROM partner_payouts WHERE id = $1", PAYOUT_COLUMNS);
  Ok(sqlx::query_as::<_, PartnerPayout>(&sql).bind(id).fetch_optional(exec).await?)
}

/// Final prices of the partner's completed bookings, summed.
pub async fn completed_revenue<'e>(exec: impl PgExecutor<'e>, partner_id: Uuid) -> AppResult<i64> {
  Ok(
    sqlx::query_scalar::<_, i64>(
      "SELECT COALESCE(SUM(b.final_price_cents), 0)::BIGINT FROM bookings b JOIN cars c ON c.id = b.car_id \
       WHERE c.partner_id = $1 AND b.status = 'completed'",
    )
    .bind(partner_id)
    .fetch_one(exec)
    .await?,
  )
}

/// Payouts that reserve balance, summed.
pub async fn reserved_total<'e>(exec: impl PgExecutor<'e>, partner_id: Uuid) -> AppResult<i64> {
  let sql = format!(
    "SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM partner_payouts \
     WHERE partner_id = $1 AND status IN ({})",
    reserving_statuses_sql()
  );
  Ok(sqlx::query_scalar::<_, i64>(&sql).bind(partner_id).fetch_one(exec).await?)
}

pub async fn insert_payout<'e>(exec: impl PgExecutor<'e>, partner_id: Uuid, amount_cents: i64) -> AppResult<PartnerPayout> {
  let sql = format!(
    "INSERT INTO partner_payouts (partner_id, amount_cents) VALUES ($1, $2) RETURNING {}",
    PAYOUT_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, PartnerPayout>(&sql)
      .bind(partner_id)
      .bind(amount_cents)
      .fetch_one(exec)
      .await?,
  )
}

/// Moves a `requested` payout to `status`. `None` when it was not pending any more.
pub async fn process_payout(pool: &PgPool, id: Uuid, status: PayoutStatus, processed_by: Uuid) -> AppResult<Option<PartnerPayout>> {
  let sql = format!(
    "UPDATE partner_payouts SET status = $2, processed_by = $3, processed_at = NOW() \
     WHERE id = $1 AND status = 'requested' RETURNING {}",
    PAYOUT_COLUMNS
  );
  Ok(
    sqlx::query_as::<_, PartnerPayout>(&sql)
      .bind(id)
      .bind(status)
      .bind(processed_by)
      .fetch_optional(pool)
      .await?,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reserving_clause_lists_requested_and_paid() {
    assert_eq!(reserving_statuses_sql(), "'requested', 'paid'");
  }
}
